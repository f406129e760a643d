use crate::format::ArchiveFormat;

/// Outcome of one successful extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    /// Entries the archive declares.
    pub entry_count: usize,
    pub files: usize,
    pub directories: usize,
    /// Stored paths left out under [`crate::UnsafePathPolicy::Skip`].
    pub skipped: Vec<String>,
    /// Decompressed bytes written to disk.
    pub total_bytes: u64,
}

impl ArchiveReport {
    pub(crate) fn new(format: ArchiveFormat, entry_count: usize) -> Self {
        Self {
            format,
            entry_count,
            files: 0,
            directories: 0,
            skipped: Vec::new(),
            total_bytes: 0,
        }
    }

    /// Entries handled so far, skipped ones included.
    pub fn processed(&self) -> usize {
        self.files + self.directories + self.skipped.len()
    }
}
