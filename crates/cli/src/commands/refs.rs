//! Refs command
//!
//! Usage: revmark refs --nav <FILE> [--changed <ID>...] [--manifest <FILE>] [--output <FILE>]

use super::{load_config, write_output};
use anyhow::Context;
use clap::Args;
use revmark_core::{ChangeManifest, ReferenceFlagger};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RefsArgs {
    /// Navigation document
    #[arg(long)]
    pub nav: PathBuf,

    /// Identifiers of changed pages
    #[arg(long, num_args = 1..)]
    pub changed: Vec<String>,

    /// Change manifest written by `revmark batch`
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute refs command
pub fn execute(args: RefsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let navigation = std::fs::read_to_string(&args.nav)
        .with_context(|| format!("failed to read {}", args.nav.display()))?;

    let mut changed: BTreeSet<String> = args.changed.into_iter().collect();
    if let Some(path) = &args.manifest {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: ChangeManifest =
            serde_json::from_str(&text).with_context(|| format!("invalid manifest {}", path.display()))?;
        changed.extend(manifest.changed_chapters);
    }

    let flagged = ReferenceFlagger::from_config(&config).flag(&navigation, &changed);
    write_output(args.output.as_deref(), &flagged)
}
