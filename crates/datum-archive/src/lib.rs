//! ZIP extraction with path sanitization and staged writes.
//!
//! # Architecture
//!
//! - `format.rs` - Format lookup by extension and signature
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract/` - Entry loop, per-entry streaming, ZIP source
//! - `options.rs` - Extraction policies and progress reporting
//!
//! Directory creation and output files live in `datum-fs`.

pub use error::{Error, Result};
pub use extract::{
    ArchiveExtractor, EntryMetadata, EntrySource, Extractor, ZipExtractor, ZipSource, extract,
    extract_entries, extract_zip, extractor_for,
};
pub use format::{ArchiveFormat, detect_format, detect_from_path};
pub use options::{
    DEFAULT_BUFFER_SIZE, ExtractOptions, PROGRESS_STEP, Progress, ProgressCallback,
    UnsafePathPolicy, WriteMode,
};
pub use report::ArchiveReport;
pub use sanitize::{SanitizedPath, resolve_within, sanitize_path};

mod error;
pub mod extract;
mod format;
mod options;
mod report;
mod sanitize;
