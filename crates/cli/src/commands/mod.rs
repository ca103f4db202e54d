pub mod batch;
pub mod diff;
pub mod refs;
pub mod strip;

use anyhow::Context;
use revmark_core::AnnotateConfig;
use std::path::Path;

/// Load a TOML configuration, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnnotateConfig> {
    let Some(path) = path else {
        return Ok(AnnotateConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    AnnotateConfig::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Read a previous version; a missing or unreadable file means there is none
pub fn read_previous(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "no previous version, treating as new");
            None
        }
    }
}

/// Write to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
