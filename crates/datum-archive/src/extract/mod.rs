//! Extraction pipeline.
//!
//! Entries are visited strictly in archive order. Each one is sanitized, then
//! either materialized as a directory or streamed to disk. The first entry
//! that fails stops the whole run.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datum_fs::ensure_dir_all;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::options::{ExtractOptions, Progress, UnsafePathPolicy};
use crate::report::ArchiveReport;
use crate::sanitize::resolve_within;

mod entry;
mod zip;

pub use self::zip::{ZipExtractor, ZipSource};

/// Metadata of the entry under the cursor.
///
/// Only valid until the source moves on to another entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMetadata {
    pub index: usize,
    /// Path as recorded in the archive, untrusted.
    pub stored_path: String,
    /// Uncompressed size recorded in the archive.
    pub size: u64,
}

/// Archive-specific access to entries, in archive order.
pub trait EntrySource {
    type Reader<'a>: Read
    where
        Self: 'a;

    fn entry_count(&self) -> usize;

    fn metadata(&mut self, index: usize) -> Result<EntryMetadata>;

    /// Open an entry's decompressed data for reading.
    fn open_entry(
        &mut self,
        entry: &EntryMetadata,
        password: Option<&[u8]>,
    ) -> Result<Self::Reader<'_>>;

    fn format(&self) -> ArchiveFormat;
}

/// Shared capability of every supported archive kind.
pub trait Extractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        options: &ExtractOptions,
    ) -> Result<ArchiveReport>;
}

pub enum ArchiveExtractor {
    Zip(ZipExtractor),
}

impl Extractor for ArchiveExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        options: &ExtractOptions,
    ) -> Result<ArchiveReport> {
        match self {
            ArchiveExtractor::Zip(extractor) => extractor.extract(archive, destination, options),
        }
    }
}

pub fn extractor_for(format: ArchiveFormat) -> ArchiveExtractor {
    match format {
        ArchiveFormat::Zip => ArchiveExtractor::Zip(ZipExtractor),
    }
}

/// Extract `archive` into the existing directory `destination`, choosing the
/// extractor from the archive's extension.
pub fn extract(archive: &Path, destination: &Path, options: &ExtractOptions) -> Result<ArchiveReport> {
    let Some(format) = ArchiveFormat::from_path(archive) else {
        warn!(file = %archive.display(), "unknown archive format");
        return Err(Error::UnsupportedFormat {
            path: archive.to_path_buf(),
        });
    };
    debug!(?format, file = %archive.display(), "extracting archive");

    let report = extractor_for(format).extract(archive, destination, options)?;
    debug!(file = %archive.display(), "successfully extracted");
    Ok(report)
}

/// Extract a ZIP archive, reporting only success or failure.
///
/// Failures are logged. With `report_progress` set, progress is logged at
/// `info` level.
pub fn extract_zip(
    archive: &Path,
    destination: &Path,
    password: Option<&str>,
    report_progress: bool,
) -> bool {
    let mut options = ExtractOptions::default();
    if let Some(password) = password {
        options = options.password(password);
    }
    if report_progress {
        options = options.on_progress(Arc::new(log_progress));
    }

    match ZipExtractor.extract(archive, destination, &options) {
        Ok(report) => {
            debug!(
                file = %archive.display(),
                files = report.files,
                directories = report.directories,
                bytes = report.total_bytes,
                "successfully extracted"
            );
            true
        }
        Err(e) => {
            error!(file = %archive.display(), error = %e, "extraction failed");
            false
        }
    }
}

fn log_progress(progress: Progress) {
    info!(
        entry = progress.current_entry.as_deref().unwrap_or(""),
        bytes = progress.bytes_written,
        "extracting {}/{} ({:.0}%)",
        progress.entries_processed,
        progress.entry_count,
        progress.percentage()
    );
}

/// Extract every entry of `source` below `root`.
///
/// `root` must be an existing directory; all destinations are computed from
/// its canonical form. Stops at the first failing entry and reports how many
/// entries had been handled in [`Error::Aborted`].
pub fn extract_entries<S: EntrySource>(
    source: &mut S,
    root: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let root = prepare_root(root)?;
    let mut report = ArchiveReport::new(source.format(), source.entry_count());

    for index in 0..report.entry_count {
        if let Err(e) = extract_one(source, index, &root, options, &mut report) {
            let processed = report.processed();
            error!(index, processed, error = %e, "aborting extraction");
            return Err(Error::Aborted {
                processed,
                source: Box::new(e),
            });
        }
    }

    Ok(report)
}

fn prepare_root(root: &Path) -> Result<PathBuf> {
    let destination_error = |source: io::Error| {
        warn!(path = %root.display(), error = %source, "invalid extraction root");
        Error::Destination {
            path: root.to_path_buf(),
            source,
        }
    };

    let canonical = fs::canonicalize(root).map_err(destination_error)?;
    if !canonical.is_dir() {
        return Err(destination_error(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    Ok(canonical)
}

fn extract_one<S: EntrySource>(
    source: &mut S,
    index: usize,
    root: &Path,
    options: &ExtractOptions,
    report: &mut ArchiveReport,
) -> Result<()> {
    let meta = source.metadata(index)?;

    let entries_processed = report.processed();
    let entry_count = report.entry_count;
    let bytes_before = report.total_bytes;
    options.report(|| Progress {
        entries_processed,
        entry_count,
        bytes_written: bytes_before,
        current_entry: Some(meta.stored_path.clone()),
    });

    let target = match resolve_within(&meta.stored_path, root, options.unsafe_paths) {
        Ok(target) => target,
        Err(e @ Error::ZipSlip { .. }) if options.unsafe_paths == UnsafePathPolicy::Skip => {
            error!(entry = %meta.stored_path, error = %e, "skipping entry");
            report.skipped.push(meta.stored_path);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if target.is_dir {
        debug!(path = %target.resolved.display(), "creating directory");
        ensure_dir_all(root, &target.resolved).map_err(|source| {
            Error::DirectoryCreationFailed {
                entry: target.original.clone(),
                source,
            }
        })?;
        report.directories += 1;
        return Ok(());
    }

    debug!(entry = %meta.stored_path, size = meta.size, "opening entry");
    let reader = source.open_entry(&meta, options.password_bytes())?;
    let written = entry::extract_entry(reader, &target, root, options, &mut |bytes| {
        options.report(|| Progress {
            entries_processed,
            entry_count,
            bytes_written: bytes_before + bytes,
            current_entry: Some(meta.stored_path.clone()),
        })
    })?;

    report.files += 1;
    report.total_bytes += written;
    Ok(())
}
