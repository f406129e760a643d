use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// How an output file reaches its final path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Write into a temporary sibling and rename it over the target on
    /// [`OutputFile::finish`]. Nothing is left behind if the writer is dropped.
    #[default]
    Staged,
    /// Truncate the target and write in place.
    Direct,
}

/// A file being written for one extracted entry.
#[derive(Debug)]
pub enum OutputFile {
    Direct { file: File, path: PathBuf },
    Staged { file: NamedTempFile, path: PathBuf },
}

impl OutputFile {
    /// Open `path` for writing.
    ///
    /// Returns the raw I/O error so callers can react to `NotFound` (missing
    /// parent directory) themselves.
    pub fn create(path: &Path, mode: WriteMode) -> io::Result<Self> {
        match mode {
            WriteMode::Direct => Ok(Self::Direct {
                file: File::create(path)?,
                path: path.to_path_buf(),
            }),
            WriteMode::Staged => {
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                let mut builder = tempfile::Builder::new();
                builder.prefix(".datum-").suffix(".part");
                // Same mode as `File::create`: 0o666 filtered by the umask.
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    builder.permissions(std::fs::Permissions::from_mode(0o666));
                }
                let file = builder.tempfile_in(parent)?;
                Ok(Self::Staged {
                    file,
                    path: path.to_path_buf(),
                })
            }
        }
    }

    /// Final destination of this file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Direct { path, .. } | Self::Staged { path, .. } => path,
        }
    }

    /// Flush and, for staged files, move the data into place.
    pub fn finish(self) -> Result<()> {
        match self {
            Self::Direct { mut file, path } => {
                file.flush().map_err(|source| Error::Write { path, source })
            }
            Self::Staged { mut file, path } => {
                file.flush().map_err(|source| Error::Write {
                    path: path.clone(),
                    source,
                })?;
                file.persist(&path).map_err(|e| Error::Persist {
                    path,
                    source: e.error,
                })?;
                Ok(())
            }
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Direct { file, .. } => file.write(buf),
            Self::Staged { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Direct { file, .. } => file.flush(),
            Self::Staged { file, .. } => file.flush(),
        }
    }
}
