use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("'{path}' exists and is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("'{path}' is not inside '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move staged file into '{path}': {source}")]
    Persist { path: PathBuf, source: io::Error },
}

impl Error {
    /// Underlying I/O error, if this failure came from the operating system.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::CreateDir { source, .. }
            | Self::Write { source, .. }
            | Self::Persist { source, .. } => Some(source),
            Self::NotADirectory { .. } | Self::OutsideRoot { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
