//! # Revmark
//!
//! Structural change annotation for markup documents. Given an old and a new
//! version of a page, revmark finds which content blocks changed and marks
//! the changed words inline, leaving every original tag byte for byte intact.
//!
//! ## Core Concepts
//!
//! - **Content units**: block elements (paragraphs, headings, list items,
//!   quotes) extracted from the main content region
//! - **Matcher**: greedy similarity matching of new units against old ones
//! - **Aligner**: word-level diff of a modified unit's plain text
//! - **Annotator**: inserts `<mark>` elements over changed text spans
//! - **AnnotationEngine**: runs the whole pipeline for one document pair
//!
//! ## Example
//!
//! ```rust
//! use revmark_core::{annotate_document, AnnotateConfig};
//!
//! let doc = annotate_document(
//!     Some("<p>The cat sat.</p>"),
//!     "<p>The cat slept.</p>",
//!     None,
//! );
//! assert_eq!(doc.summary.changed_unit_count, 1);
//! assert!(doc.markup.contains("<mark class=\"modified-text\""));
//! # let _ = AnnotateConfig::default();
//! ```

pub mod algorithm;
pub mod alignment;
pub mod annotate;
pub mod banner;
pub mod batch;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod extract;
pub mod logging;
pub mod mapping;
pub mod markup;
pub mod matcher;
pub mod metrics;
pub mod references;
pub mod tokenizers;

// Re-export main types
pub use alignment::WordAligner;
pub use annotate::{strip_markers, Annotator};
pub use banner::{render_index_notice, render_notice, BannerInjector, PageLink};
pub use batch::{
    annotate_all, changed_identifiers, changed_page_links, BatchResult, ChangeManifest, DocumentPair, INDEX_PAGE,
};
pub use config::{Anchor, AnnotateConfig, DiffAlgorithm, MarkerClasses};
pub use diff::{ChangeKind, ChangeRange};
pub use engine::{AnnotatedDocument, AnnotationEngine, ChangeSummary, UnitChange};
pub use error::{AnnotateError, Result};
pub use extract::{ContentUnit, ParsedMarkup};
pub use matcher::{MatchOutcome, MatchedPair, UnitMatcher, UnitVerdict};
pub use metrics::{document_similarity, similarity_ratio};
pub use references::ReferenceFlagger;

/// Main entry point for annotating one document pair
///
/// # Arguments
///
/// * `old` - The previous version, or `None` on first publication
/// * `new` - The version to annotate
/// * `config` - Optional configuration (uses default if None)
pub fn annotate_document(old: Option<&str>, new: &str, config: Option<AnnotateConfig>) -> AnnotatedDocument {
    let config = config.unwrap_or_default();
    AnnotationEngine::new(config).annotate(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_annotation() {
        let doc = annotate_document(Some("<p>Hello.</p>"), "<p>Hello.</p><p>World.</p>", None);
        assert_eq!(doc.summary.changed_unit_count, 1);
        assert!(doc.markup.ends_with("<p><mark class=\"added-element\">World.</mark></p>"));
    }

    #[test]
    fn test_with_config() {
        let config = AnnotateConfig::default().with_provenance(false);
        let doc = annotate_document(Some("<p>The cat sat.</p>"), "<p>The cat slept.</p>", Some(config));
        assert_eq!(doc.markup, "<p>The cat <mark class=\"modified-text\">slept.</mark></p>");
    }
}
