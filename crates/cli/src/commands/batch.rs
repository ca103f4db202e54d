//! Batch command
//!
//! Usage: revmark batch --new-dir <DIR> --out-dir <DIR> [--old-dir <DIR>] [--manifest <FILE>] [--notice]
//!
//! With `--notice`, changed pages get a change notice and the index page
//! gets a notice linking every changed page.

use super::diff::with_notice;
use super::load_config;
use anyhow::Context;
use clap::Args;
use revmark_core::{
    annotate_all, changed_page_links, render_index_notice, AnnotationEngine, BannerInjector, ChangeManifest,
    DocumentPair,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Directory holding the new build's pages
    #[arg(long)]
    pub new_dir: PathBuf,

    /// Directory holding the previous build's pages
    #[arg(long)]
    pub old_dir: Option<PathBuf>,

    /// Directory receiving the annotated pages
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Write the list of changed pages as JSON to this file
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Insert a change notice into changed pages and a list of changed
    /// pages into the index page
    #[arg(long)]
    pub notice: bool,
}

/// Execute batch command
pub fn execute(args: BatchArgs) -> anyhow::Result<()> {
    let engine = AnnotationEngine::new(load_config(args.config.as_deref())?);
    let pairs = collect_pairs(&args.new_dir, args.old_dir.as_deref())?;

    let results = annotate_all(&engine, &pairs);

    let index_notice = render_index_notice(&changed_page_links(&results));
    let injector = BannerInjector::from_config(engine.config());

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    for result in &results {
        let markup = if !args.notice {
            result.document.markup.clone()
        } else if result.is_index() {
            injector.inject(&with_notice(&engine, &result.document), &index_notice)
        } else {
            with_notice(&engine, &result.document)
        };
        let path = args.out_dir.join(format!("{}.html", result.name));
        std::fs::write(&path, markup).with_context(|| format!("failed to write {}", path.display()))?;
    }

    let manifest = ChangeManifest::from_results(&results);
    if let Some(path) = &args.manifest {
        std::fs::write(path, manifest.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!(
        "✓ Annotated {} page(s), {} changed",
        results.len(),
        manifest.count
    );
    Ok(())
}

/// Pages of `new_dir` paired with same-named pages of `old_dir`, by name
fn collect_pairs(new_dir: &Path, old_dir: Option<&Path>) -> anyhow::Result<Vec<DocumentPair>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(new_dir)
        .with_context(|| format!("failed to read {}", new_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    paths.sort();

    let mut pairs = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let new = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let old = old_dir.and_then(|dir| std::fs::read_to_string(dir.join(path.file_name()?)).ok());
        pairs.push(DocumentPair::new(name, old, new));
    }
    Ok(pairs)
}
