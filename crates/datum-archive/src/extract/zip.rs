use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};
use crate::extract::{EntryMetadata, EntrySource, Extractor, extract_entries};
use crate::format::{ArchiveFormat, with_suffix};
use crate::options::ExtractOptions;
use crate::report::ArchiveReport;

/// ZIP archive read through the `zip` crate.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> std::result::Result<Self, ZipError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }
}

impl ZipSource<BufReader<File>> {
    /// Open the archive at `path`, retrying once as `<path>.zip`.
    pub fn open(path: &Path) -> Result<Self> {
        let first = match open_file(path) {
            Ok(source) => return Ok(source),
            Err(e) => e,
        };

        let suffixed = with_suffix(path, ArchiveFormat::Zip.extension());
        debug!(
            path = %path.display(),
            error = %first,
            "retrying with {}",
            suffixed.display()
        );
        open_file(&suffixed).map_err(|_| {
            warn!(path = %path.display(), error = %first, "failed to open archive");
            Error::Open {
                path: path.to_path_buf(),
                source: first,
            }
        })
    }
}

fn open_file(path: &Path) -> std::result::Result<ZipSource<BufReader<File>>, ZipError> {
    let file = File::open(path)?;
    ZipSource::new(BufReader::new(file))
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    type Reader<'a>
        = zip::read::ZipFile<'a, R>
    where
        Self: 'a;

    fn entry_count(&self) -> usize {
        self.archive.len()
    }

    fn metadata(&mut self, index: usize) -> Result<EntryMetadata> {
        let file = self
            .archive
            .by_index_raw(index)
            .map_err(|source| Error::MetadataRead { index, source })?;

        Ok(EntryMetadata {
            index,
            stored_path: file.name().to_string(),
            size: file.size(),
        })
    }

    fn open_entry(
        &mut self,
        entry: &EntryMetadata,
        password: Option<&[u8]>,
    ) -> Result<Self::Reader<'_>> {
        let opened = match password {
            Some(password) => self.archive.by_index_decrypt(entry.index, password),
            None => self.archive.by_index(entry.index),
        };
        opened.map_err(|e| open_error(&entry.stored_path, e))
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

fn open_error(entry: &str, error: ZipError) -> Error {
    let entry = entry.to_string();
    match error {
        ZipError::InvalidPassword => Error::InvalidPassword { entry },
        ZipError::UnsupportedArchive(detail) if detail == ZipError::PASSWORD_REQUIRED => {
            Error::PasswordRequired { entry }
        }
        source => Error::EntryOpen { entry, source },
    }
}

/// Extracts `.zip` files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        options: &ExtractOptions,
    ) -> Result<ArchiveReport> {
        let mut source = ZipSource::open(archive)?;
        extract_entries(&mut source, destination, options)
    }
}
