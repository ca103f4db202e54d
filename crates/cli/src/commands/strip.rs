//! Strip command
//!
//! Usage: revmark strip <FILE> [--output <FILE>]

use super::{load_config, write_output};
use anyhow::Context;
use clap::Args;
use revmark_core::strip_markers;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StripArgs {
    /// Annotated document
    pub file: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file (marker classes)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute strip command
pub fn execute(args: StripArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let markup = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let stripped = strip_markers(&markup, &config.markers)
        .with_context(|| format!("cannot strip markers from {}", args.file.display()))?;
    write_output(args.output.as_deref(), &stripped)
}
