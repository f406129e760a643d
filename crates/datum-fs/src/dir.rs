use std::fs;
use std::io;
use std::path::{Component, Path};

use tracing::debug;

use crate::{Error, Result};

/// Create every missing directory level between `root` and `path`.
///
/// `root` must already exist. Levels that exist as directories are left
/// alone, so calling this repeatedly is harmless. A level that exists as
/// anything other than a directory is an error.
pub fn ensure_dir_all(root: &Path, path: &Path) -> Result<()> {
    let relative = path.strip_prefix(root).map_err(|_| Error::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    if !root.is_dir() {
        return Err(Error::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut current = root.to_path_buf();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            current.push(part);
            create_level(&current)?;
        }
    }

    Ok(())
}

fn create_level(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!(path = %path.display(), "created directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(Error::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(source) => Err(Error::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}
