use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use datum_archive::{ArchiveFormat, ExtractOptions, UnsafePathPolicy, WriteMode};
use tracing::warn;

use crate::tracker::ProgressTracker;

#[derive(Clone, Debug, Parser)]
#[command(name = "datum", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "x", name = "extract", about = "Extract an archive into a directory")]
    Extract(ExtractArg),
    #[command(name = "formats", about = "List supported archive extensions")]
    Formats,
}

#[derive(Clone, Debug, Args)]
pub struct ExtractArg {
    /// Archive to extract; a missing `.zip` suffix is tolerated
    pub archive: PathBuf,

    /// Existing directory to extract into
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Password for encrypted entries
    #[arg(long)]
    pub password: Option<String>,

    /// What to do with entries whose path leaves the target directory
    #[arg(long, value_enum, default_value_t = UnsafePaths::Abort)]
    pub on_unsafe_path: UnsafePaths,

    /// Write files in place instead of staging them
    #[arg(long)]
    pub direct: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnsafePaths {
    Abort,
    Skip,
    Strip,
}

impl From<UnsafePaths> for UnsafePathPolicy {
    fn from(value: UnsafePaths) -> Self {
        match value {
            UnsafePaths::Abort => UnsafePathPolicy::Abort,
            UnsafePaths::Skip => UnsafePathPolicy::Skip,
            UnsafePaths::Strip => UnsafePathPolicy::Strip,
        }
    }
}

impl ExtractArg {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::default()
            .unsafe_paths(self.on_unsafe_path.into())
            .write_mode(if self.direct {
                WriteMode::Direct
            } else {
                WriteMode::Staged
            });
        if let Some(ref password) = self.password {
            options = options.password(password.as_str());
        }
        options
    }

    pub fn run(self, quiet: bool) -> Result<()> {
        let tracker = ProgressTracker::new(quiet || self.no_progress);
        let options = self.options().on_progress(tracker.callback());

        let result = datum_archive::extract(&self.archive, &self.dir, &options);
        tracker.finish();
        let report = result
            .with_context(|| format!("failed to extract '{}'", self.archive.display()))?;

        for stored in &report.skipped {
            warn!(entry = %stored, "skipped unsafe entry");
        }
        if !quiet {
            println!(
                "extracted {} files and {} directories ({} bytes) into {}",
                report.files,
                report.directories,
                report.total_bytes,
                self.dir.display()
            );
        }
        Ok(())
    }
}

pub fn formats() {
    for format in ArchiveFormat::ALL {
        println!("{}", format.extension());
    }
}
