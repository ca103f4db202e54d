//! Batch annotation over many document pairs
//!
//! Document pairs are independent, so with the `parallel` feature they are
//! annotated on the rayon pool. Results always come back in input order.

use crate::banner::PageLink;
use crate::engine::{AnnotatedDocument, AnnotationEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Identifier of the home page; it links the changed pages rather than
/// being listed among them
pub const INDEX_PAGE: &str = "index";

/// One logical page in both versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    /// Identifier of the page, e.g. its file stem
    pub name: String,
    pub old: Option<String>,
    pub new: String,
}

impl DocumentPair {
    pub fn new(name: impl Into<String>, old: Option<String>, new: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            old,
            new: new.into(),
        }
    }
}

/// Annotation result for one named page
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub name: String,
    pub document: AnnotatedDocument,
}

impl BatchResult {
    /// See [`ChangeSummary::is_changed`](crate::engine::ChangeSummary::is_changed)
    pub fn is_changed(&self) -> bool {
        self.document.summary.is_changed()
    }

    pub fn is_index(&self) -> bool {
        self.name == INDEX_PAGE
    }
}

/// Annotate every pair, preserving input order
pub fn annotate_all(engine: &AnnotationEngine, pairs: &[DocumentPair]) -> Vec<BatchResult> {
    let run = |pair: &DocumentPair| BatchResult {
        name: pair.name.clone(),
        document: engine.annotate(pair.old.as_deref(), &pair.new),
    };

    #[cfg(feature = "parallel")]
    let results: Vec<BatchResult> = pairs.par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<BatchResult> = pairs.iter().map(run).collect();

    tracing::info!(
        documents = results.len(),
        changed = results.iter().filter(|r| r.is_changed()).count(),
        "batch annotated"
    );
    results
}

/// Names of changed pages other than the index, sorted and deduplicated
pub fn changed_identifiers(results: &[BatchResult]) -> BTreeSet<String> {
    results
        .iter()
        .filter(|r| r.is_changed() && !r.is_index())
        .map(|r| r.name.clone())
        .collect()
}

/// Index notice links for the changed pages, sorted by identifier
pub fn changed_page_links(results: &[BatchResult]) -> Vec<PageLink> {
    let mut links: Vec<PageLink> = results
        .iter()
        .filter(|r| r.is_changed() && !r.is_index())
        .map(|r| PageLink::from_page(r.name.as_str(), &r.document.markup))
        .collect();
    links.sort_by(|a, b| a.id.cmp(&b.id));
    links.dedup_by(|a, b| a.id == b.id);
    links
}

/// Machine-readable list of changed pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeManifest {
    pub changed_chapters: Vec<String>,
    pub count: usize,
}

impl ChangeManifest {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let changed_chapters: Vec<String> = changed_identifiers(results).into_iter().collect();
        Self {
            count: changed_chapters.len(),
            changed_chapters,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
