//! Diff command
//!
//! Usage: revmark diff --new <FILE> [--old <FILE>] [--output <FILE>] [--summary <FILE>]

use super::{load_config, read_previous, write_output};
use anyhow::Context;
use clap::Args;
use revmark_core::{render_notice, AnnotatedDocument, AnnotationEngine, BannerInjector};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// New version of the document
    #[arg(long)]
    pub new: PathBuf,

    /// Previous version (missing file: first publication)
    #[arg(long)]
    pub old: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the change summary as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Insert a change notice when the document changed
    #[arg(long)]
    pub notice: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let new = std::fs::read_to_string(&args.new)
        .with_context(|| format!("failed to read {}", args.new.display()))?;
    let old = read_previous(args.old.as_deref());

    let engine = AnnotationEngine::new(config);
    let document = engine.annotate(old.as_deref(), &new);
    let markup = if args.notice {
        with_notice(&engine, &document)
    } else {
        document.markup.clone()
    };

    write_output(args.output.as_deref(), &markup)?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&document.summary)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    if args.output.is_some() {
        println!(
            "  {} changed block(s), ~{}% of content changed",
            document.summary.changed_unit_count,
            document.summary.change_percent()
        );
    }

    Ok(())
}

/// Document markup with a notice, when there is anything to report
pub fn with_notice(engine: &AnnotationEngine, document: &AnnotatedDocument) -> String {
    let summary = &document.summary;
    if !summary.is_changed() {
        return document.markup.clone();
    }
    let notice = render_notice(summary, &engine.config().markers);
    BannerInjector::from_config(engine.config()).inject(&document.markup, &notice)
}
