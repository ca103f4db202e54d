//! Document orchestrator
//!
//! Runs the whole pipeline for one document pair: extract units from both
//! versions, gate on whole-document similarity, match units, align and
//! annotate every changed unit, then splice the results back into the new
//! document by byte span. It never fails; any stage that cannot produce a
//! safe annotation degrades to passing markup through.

use crate::alignment::WordAligner;
use crate::annotate::Annotator;
use crate::config::AnnotateConfig;
use crate::diff::ChangeKind;
use crate::extract::{ContentUnit, ParsedMarkup};
use crate::matcher::{UnitMatcher, UnitVerdict};
use crate::metrics::document_similarity;
use serde::Serialize;
use std::time::Instant;

/// One changed unit of the new document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitChange {
    /// Ordinal of the unit in the new document
    pub unit: usize,
    pub tag: String,
    pub kind: ChangeKind,
    /// Ordinal of the matched old unit (modified units only)
    pub old_unit: Option<usize>,
    pub similarity: Option<f64>,
    /// Number of inline ranges highlighted
    pub highlighted_ranges: usize,
    /// False when the unit was passed through unannotated
    pub annotated: bool,
}

/// Summary of one annotated document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub changed_unit_count: usize,
    /// Whole-document similarity of the content regions, in [0, 1]
    pub similarity_ratio: f64,
    /// Similarity fell below the document gate
    pub substantially_changed: bool,
    /// No old document was supplied
    pub first_publish: bool,
    pub changes: Vec<UnitChange>,
}

impl ChangeSummary {
    fn unchanged(similarity_ratio: f64, gate: f64, first_publish: bool) -> Self {
        Self {
            changed_unit_count: 0,
            similarity_ratio,
            substantially_changed: similarity_ratio < gate,
            first_publish,
            changes: Vec::new(),
        }
    }

    /// Share of the document that changed, as a whole percentage
    pub fn change_percent(&self) -> u32 {
        ((1.0 - self.similarity_ratio.clamp(0.0, 1.0)) * 100.0).floor() as u32
    }

    pub fn has_changes(&self) -> bool {
        self.changed_unit_count > 0
    }

    /// Whether the document should be reported as changed: new, carrying
    /// changed units, or below the document gate. Content that was only
    /// deleted shows up through the gate alone.
    pub fn is_changed(&self) -> bool {
        self.first_publish || self.has_changes() || self.substantially_changed
    }
}

/// The new document with change markers, plus its summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedDocument {
    pub markup: String,
    pub summary: ChangeSummary,
}

/// The annotation engine
#[derive(Clone)]
pub struct AnnotationEngine {
    config: AnnotateConfig,
    matcher: UnitMatcher,
    aligner: WordAligner,
    annotator: Annotator,
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AnnotationEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: AnnotateConfig) -> Self {
        Self {
            matcher: UnitMatcher::new(config.min_similarity, config.max_similarity),
            aligner: WordAligner::new().with_algorithm(config.algorithm),
            annotator: Annotator::from_config(&config),
            config,
        }
    }

    /// Create an engine with the default configuration
    pub fn default_config() -> Self {
        Self::new(AnnotateConfig::default())
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Annotate `new` against `old`.
    ///
    /// An absent old document means first publication: similarity is 0 and
    /// every non-empty unit is flagged as added.
    pub fn annotate(&self, old: Option<&str>, new: &str) -> AnnotatedDocument {
        let start = Instant::now();
        let gate = self.config.document_gate;

        let parsed_new = match ParsedMarkup::parse(new) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "new document is malformed, passing through");
                let similarity = old.map_or(0.0, |old| document_similarity(old, new));
                return passthrough(new, ChangeSummary::unchanged(similarity, gate, old.is_none()));
            }
        };
        let new_region = parsed_new.content_region(&self.config.content_anchors);
        let new_units = parsed_new.units(new_region.clone(), |name| self.config.is_comparable(name));

        let (old_units, similarity) = match old {
            None => (Vec::new(), 0.0),
            Some(old) => match ParsedMarkup::parse(old) {
                Ok(parsed_old) => {
                    let old_region = parsed_old.content_region(&self.config.content_anchors);
                    let similarity = document_similarity(&old[old_region.clone()], &new[new_region]);
                    let units = parsed_old.units(old_region, |name| self.config.is_comparable(name));
                    (units, similarity)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "old document is malformed, passing through");
                    let similarity = document_similarity(old, new);
                    return passthrough(new, ChangeSummary::unchanged(similarity, gate, false));
                }
            },
        };

        if similarity >= gate {
            tracing::debug!(similarity, gate, "document similarity at or above gate, checking units anyway");
        }

        let outcome = self.matcher.match_units(&old_units, &new_units);
        let mut changes = Vec::with_capacity(outcome.changed_count());
        let mut markup = String::with_capacity(new.len() + outcome.changed_count() * 64);
        let mut cursor = 0;

        for (unit, verdict) in new_units.iter().zip(&outcome.verdicts) {
            let Some((replacement, change)) = self.annotate_unit(unit, verdict, &old_units) else {
                continue;
            };
            markup.push_str(&new[cursor..unit.span.start]);
            markup.push_str(&replacement);
            cursor = unit.span.end;
            changes.push(change);
        }
        markup.push_str(&new[cursor..]);

        let summary = ChangeSummary {
            changed_unit_count: changes.len(),
            similarity_ratio: similarity,
            substantially_changed: similarity < gate,
            first_publish: old.is_none(),
            changes,
        };

        tracing::info!(
            op = "annotate",
            units_old = old_units.len(),
            units_new = new_units.len(),
            changed_units = summary.changed_unit_count,
            similarity = summary.similarity_ratio,
            substantially_changed = summary.substantially_changed,
            duration_ms = start.elapsed().as_millis() as u64,
            "document annotated"
        );

        AnnotatedDocument { markup, summary }
    }

    /// Annotated markup and change record for a changed unit; `None` for
    /// units that need no marker.
    fn annotate_unit(
        &self,
        unit: &ContentUnit,
        verdict: &UnitVerdict,
        old_units: &[ContentUnit],
    ) -> Option<(String, UnitChange)> {
        let (result, change) = match verdict {
            UnitVerdict::Empty | UnitVerdict::Unchanged { .. } => return None,
            UnitVerdict::Modified(pair) => {
                let old_text = old_units.get(pair.old_index).map_or("", |u| u.text.as_str());
                let ranges = self.aligner.align(old_text, &unit.text);
                let change = UnitChange {
                    unit: unit.ordinal,
                    tag: unit.tag.clone(),
                    kind: ChangeKind::Modified,
                    old_unit: Some(pair.old_index),
                    similarity: Some(pair.similarity),
                    highlighted_ranges: ranges.len(),
                    annotated: true,
                };
                (self.annotator.annotate(&unit.markup, &ranges), change)
            }
            UnitVerdict::Added => {
                let change = UnitChange {
                    unit: unit.ordinal,
                    tag: unit.tag.clone(),
                    kind: ChangeKind::Added,
                    old_unit: None,
                    similarity: None,
                    highlighted_ranges: 1,
                    annotated: true,
                };
                (self.annotator.wrap_whole(&unit.markup), change)
            }
        };

        match result {
            Ok(markup) => Some((markup, change)),
            Err(err) => {
                tracing::warn!(unit = unit.ordinal, error = %err, "unit left unannotated");
                let change = UnitChange {
                    highlighted_ranges: 0,
                    annotated: false,
                    ..change
                };
                Some((unit.markup.clone(), change))
            }
        }
    }
}

fn passthrough(new: &str, summary: ChangeSummary) -> AnnotatedDocument {
    AnnotatedDocument {
        markup: new.to_string(),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::strip_markers;

    fn engine() -> AnnotationEngine {
        AnnotationEngine::default_config()
    }

    #[test]
    fn test_modified_unit() {
        let doc = engine().annotate(Some("<p>The cat sat.</p>"), "<p>The cat slept.</p>");
        assert_eq!(
            doc.markup,
            "<p>The cat <mark class=\"modified-text\" title=\"Modified from: sat.\">slept.</mark></p>"
        );
        assert_eq!(doc.summary.changed_unit_count, 1);
        assert_eq!(doc.summary.changes[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn test_identical_documents() {
        let markup = "<p>A quick brown fox.</p>";
        let doc = engine().annotate(Some(markup), markup);
        assert_eq!(doc.markup, markup);
        assert_eq!(doc.summary.changed_unit_count, 0);
        assert_eq!(doc.summary.similarity_ratio, 1.0);
        assert!(!doc.summary.substantially_changed);
        assert_eq!(doc.summary.change_percent(), 0);
    }

    #[test]
    fn test_first_publish() {
        let doc = engine().annotate(None, "<p>Brand new page.</p>");
        assert_eq!(doc.markup, "<p><mark class=\"added-element\">Brand new page.</mark></p>");
        assert_eq!(doc.summary.similarity_ratio, 0.0);
        assert!(doc.summary.first_publish);
        assert_eq!(doc.summary.change_percent(), 100);
    }

    #[test]
    fn test_splices_by_position() {
        let old = "<p>Same.</p><p>Same.</p>";
        let new = "<p>Same.</p><p>Same.</p><p>Same.</p>";
        let doc = engine().annotate(Some(old), new);
        // unchanged units never consume their old counterpart
        assert_eq!(doc.summary.changed_unit_count, 0);
        assert_eq!(doc.markup, new);

        let doc = engine().annotate(Some("<p>Intro.</p>"), "<p>Intro.</p><p>Fresh words.</p><p>Intro.</p>");
        assert_eq!(
            doc.markup,
            "<p>Intro.</p><p><mark class=\"added-element\">Fresh words.</mark></p><p>Intro.</p>"
        );
    }

    #[test]
    fn test_content_region_only() {
        let old = "<nav><p>Menu</p></nav><main><p>Body text here.</p></main>";
        let new = "<nav><p>Other menu</p></nav><main><p>Body text here.</p></main>";
        let doc = engine().annotate(Some(old), new);
        assert_eq!(doc.markup, new);
        assert_eq!(doc.summary.similarity_ratio, 1.0);
    }

    #[test]
    fn test_malformed_unit_passes_through() {
        let old = "<p>The cat sat.</p>";
        let new = "<p>The <b>cat slept.</p>";
        let doc = engine().annotate(Some(old), new);
        assert_eq!(doc.markup, new);
        assert_eq!(doc.summary.changed_unit_count, 1);
        assert!(!doc.summary.changes[0].annotated);
    }

    #[test]
    fn test_malformed_documents_pass_through() {
        let doc = engine().annotate(Some("<p>x</p>"), "<p>unterminated <!-- comment");
        assert_eq!(doc.markup, "<p>unterminated <!-- comment");
        assert_eq!(doc.summary.changed_unit_count, 0);

        let new = "<p>fine</p>";
        let doc = engine().annotate(Some("<p attr=\"x"), new);
        assert_eq!(doc.markup, new);
    }

    #[test]
    fn test_strip_round_trip() {
        let old = "<h1>Title</h1><p>First paragraph of text.</p><p>Second one.</p>";
        let new = "<h1>Title</h1><p>First paragraph of new text.</p><p>Second one.</p><li>Extra</li>";
        let engine = engine();
        let doc = engine.annotate(Some(old), new);
        assert_eq!(doc.summary.changed_unit_count, 2);
        assert_eq!(strip_markers(&doc.markup, &engine.config().markers).unwrap(), new);
    }

    #[test]
    fn test_short_heading_edit_is_modified() {
        let doc = engine().annotate(Some("<h2>Methods</h2>"), "<h2>Methods.</h2>");
        assert_eq!(
            doc.markup,
            "<h2><mark class=\"modified-text\" title=\"Modified from: Methods\">Methods.</mark></h2>"
        );
        assert_eq!(doc.summary.changes[0].kind, ChangeKind::Modified);
        assert_eq!(doc.summary.changes[0].old_unit, Some(0));
    }

    #[test]
    fn test_deletion_only_is_changed() {
        let old = "<main><p>Keep this one.</p><p>Remove the whole safety section now.</p></main>";
        let new = "<main><p>Keep this one.</p></main>";
        let doc = engine().annotate(Some(old), new);
        assert_eq!(doc.markup, new);
        assert!(!doc.summary.has_changes());
        assert!(doc.summary.substantially_changed);
        assert!(doc.summary.is_changed());

        let same = engine().annotate(Some(new), new);
        assert!(!same.summary.is_changed());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let doc = engine().annotate(None, "<p>x</p>");
        let json = serde_json::to_value(&doc.summary).unwrap();
        assert_eq!(json["changedUnitCount"], 1);
        assert_eq!(json["similarityRatio"], 0.0);
        assert_eq!(json["changes"][0]["kind"], "added");
    }
}
