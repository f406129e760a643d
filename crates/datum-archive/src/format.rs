use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
}

impl ArchiveFormat {
    pub const ALL: &'static [ArchiveFormat] = &[ArchiveFormat::Zip];

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
        }
    }

    /// Look up a format by file extension, ignoring ASCII case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
    }

    /// Pick the format for an archive path.
    ///
    /// Uses the extension when there is one. A path without an extension is
    /// identified by its leading bytes, or by those of `<path>.zip` when the
    /// path itself does not exist.
    pub fn from_path(path: &Path) -> Option<Self> {
        if let Some(extension) = path.extension() {
            return extension.to_str().and_then(Self::from_extension);
        }

        let candidate = if path.exists() {
            path.to_path_buf()
        } else {
            with_suffix(path, Self::Zip.extension())
        };
        detect_from_path(&candidate).ok().flatten()
    }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        // local file header, empty archive, spanned archive
        [0x50, 0x4B, 0x03, 0x04, ..]
        | [0x50, 0x4B, 0x05, 0x06, ..]
        | [0x50, 0x4B, 0x07, 0x08, ..] => Some(ArchiveFormat::Zip),
        _ => None,
    }
}

pub fn detect_from_path(path: &Path) -> io::Result<Option<ArchiveFormat>> {
    let mut header = Vec::with_capacity(4);
    File::open(path)?.take(4).read_to_end(&mut header)?;
    Ok(detect_format(&header))
}

/// `path` with `.{extension}` appended to its final component.
pub(crate) fn with_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
