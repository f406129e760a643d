use std::fmt;
use std::sync::Arc;

pub use datum_fs::WriteMode;

/// Size of the buffer used to stream entry data to disk.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Bytes written within one entry between two progress updates.
pub const PROGRESS_STEP: u64 = 1024 * 1024;

/// What to do with an entry whose stored path would leave the extraction root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnsafePathPolicy {
    /// Stop the whole extraction.
    #[default]
    Abort,
    /// Log the entry, leave it out, and keep going.
    Skip,
    /// Drop root, drive, `.` and `..` segments and write what remains.
    Strip,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub entries_processed: usize,
    pub entry_count: usize,
    pub bytes_written: u64,
    pub current_entry: Option<String>,
}

impl Progress {
    pub fn percentage(&self) -> f32 {
        if self.entry_count == 0 {
            100.0
        } else {
            (self.entries_processed as f32 / self.entry_count as f32) * 100.0
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

#[derive(Clone)]
pub struct ExtractOptions {
    pub password: Option<String>,
    pub unsafe_paths: UnsafePathPolicy,
    pub write_mode: WriteMode,
    pub buffer_size: usize,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            password: None,
            unsafe_paths: UnsafePathPolicy::default(),
            write_mode: WriteMode::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            on_progress: None,
        }
    }
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("unsafe_paths", &self.unsafe_paths)
            .field("write_mode", &self.write_mode)
            .field("buffer_size", &self.buffer_size)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl ExtractOptions {
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn unsafe_paths(mut self, policy: UnsafePathPolicy) -> Self {
        self.unsafe_paths = policy;
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn password_bytes(&self) -> Option<&[u8]> {
        self.password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(str::as_bytes)
    }

    pub(crate) fn report(&self, progress: impl FnOnce() -> Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(progress());
        }
    }
}
