use std::io;
use std::path::PathBuf;

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format for '{path}'")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to open archive '{path}': {source}")]
    Open { path: PathBuf, source: ZipError },

    #[error("invalid extraction root '{path}': {source}")]
    Destination { path: PathBuf, source: io::Error },

    #[error("failed to read metadata of entry #{index}: {source}")]
    MetadataRead { index: usize, source: ZipError },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: String, resolved: PathBuf },

    #[error("entry path '{entry}' contains a null byte")]
    InvalidPath { entry: String },

    #[error("failed to create directory for '{entry}': {source}")]
    DirectoryCreationFailed {
        entry: String,
        source: datum_fs::Error,
    },

    #[error("failed to open '{path}' for writing: {source}")]
    FileOpen { path: PathBuf, source: io::Error },

    #[error("entry '{entry}' is encrypted and no password was given")]
    PasswordRequired { entry: String },

    #[error("wrong password for entry '{entry}'")]
    InvalidPassword { entry: String },

    #[error("failed to open entry '{entry}': {source}")]
    EntryOpen { entry: String, source: ZipError },

    #[error("failed to read entry '{entry}': {source}")]
    StreamRead { entry: String, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    StreamWrite { path: PathBuf, source: io::Error },

    #[error("failed to finish '{path}': {source}")]
    Commit {
        path: PathBuf,
        source: datum_fs::Error,
    },

    #[error("extraction aborted after {processed} entries: {source}")]
    Aborted {
        processed: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The error that caused the extraction to stop, past any abort wrapper.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Number of entries fully handled before the failure, when known.
    pub fn processed(&self) -> Option<usize> {
        match self {
            Self::Aborted { processed, .. } => Some(*processed),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
