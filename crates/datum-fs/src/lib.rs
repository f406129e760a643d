//! Filesystem primitives for writing archive contents under a fixed root.
//!
//! - [`ensure_dir_all`] materializes a directory hierarchy below a root.
//! - [`OutputFile`] writes one file either in place or through a staged
//!   temporary that is renamed into place once complete.

mod dir;
mod error;
mod output;

pub use dir::ensure_dir_all;
pub use error::{Error, Result};
pub use output::{OutputFile, WriteMode};
