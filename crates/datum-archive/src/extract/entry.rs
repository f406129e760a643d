use std::io::{self, Read, Write};
use std::path::Path;

use datum_fs::{OutputFile, WriteMode, ensure_dir_all};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::options::{ExtractOptions, PROGRESS_STEP};
use crate::sanitize::SanitizedPath;

/// Stream one file entry from `reader` to its sanitized destination.
///
/// Returns the number of bytes written. `on_bytes` receives the running total
/// each time it crosses a multiple of [`PROGRESS_STEP`].
pub(crate) fn extract_entry<R: Read>(
    reader: R,
    target: &SanitizedPath,
    root: &Path,
    options: &ExtractOptions,
    on_bytes: &mut dyn FnMut(u64),
) -> Result<u64> {
    let mut output = open_output(target, root, options.write_mode)?;
    debug!(path = %target.resolved.display(), "extracting");

    let written = copy_entry(
        reader,
        &mut output,
        &target.original,
        &target.resolved,
        options.buffer_size,
        on_bytes,
    )
    .inspect_err(|e| {
        warn!(entry = %target.original, error = %e, "entry extraction failed");
        if options.write_mode == WriteMode::Direct {
            warn!(path = %output.path().display(), "partially written file left on disk");
        }
    })?;

    output.finish().map_err(|source| Error::Commit {
        path: target.resolved.clone(),
        source,
    })?;

    Ok(written)
}

/// Open the destination, creating its parent hierarchy and retrying once when
/// the archive did not list the parent directory first.
fn open_output(target: &SanitizedPath, root: &Path, mode: WriteMode) -> Result<OutputFile> {
    let file_open = |source: io::Error| Error::FileOpen {
        path: target.resolved.clone(),
        source,
    };

    match OutputFile::create(&target.resolved, mode) {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let parent = target.resolved.parent().unwrap_or(root);
            debug!(path = %parent.display(), "creating missing parent directory");
            ensure_dir_all(root, parent).map_err(|source| Error::DirectoryCreationFailed {
                entry: target.original.clone(),
                source,
            })?;
            OutputFile::create(&target.resolved, mode).map_err(file_open)
        }
        Err(source) => Err(file_open(source)),
    }
}

/// Copy an entry in `buffer_size` chunks until the reader reports end of data.
pub(crate) fn copy_entry<R: Read, W: Write>(
    mut reader: R,
    writer: &mut W,
    entry: &str,
    path: &Path,
    buffer_size: usize,
    on_bytes: &mut dyn FnMut(u64),
) -> Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut written = 0u64;
    let mut next_report = PROGRESS_STEP;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::StreamRead {
                    entry: entry.to_string(),
                    source,
                });
            }
        };

        writer
            .write_all(&buf[..n])
            .map_err(|source| Error::StreamWrite {
                path: path.to_path_buf(),
                source,
            })?;

        written += n as u64;
        if written >= next_report {
            on_bytes(written);
            while next_report <= written {
                next_report += PROGRESS_STEP;
            }
        }
    }

    Ok(written)
}
