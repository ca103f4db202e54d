//! Configuration for the annotation engine

use crate::error::{AnnotateError, Result};
use crate::markup::TagInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token alignment algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Myers O(ND) algorithm (default, fast for small differences)
    #[default]
    Myers,
    /// Classic dynamic-programming LCS, quadratic in time and memory
    Lcs,
}

/// Structural anchor for the main content region, written `tag` or `tag.class`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Anchor {
    pub tag: String,
    pub class: Option<String>,
}

impl Anchor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Whether a start tag satisfies this anchor
    pub fn matches(&self, tag: &TagInfo) -> bool {
        tag.name == self.tag && self.class.as_deref().map_or(true, |c| tag.has_class(c))
    }
}

impl FromStr for Anchor {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self> {
        let (tag, class) = match s.split_once('.') {
            Some((tag, class)) => (tag.trim(), Some(class.trim())),
            None => (s.trim(), None),
        };
        if tag.is_empty() || class.is_some_and(str::is_empty) {
            return Err(AnnotateError::InvalidConfig(format!("invalid anchor `{s}`")));
        }
        let anchor = Anchor::new(tag);
        Ok(match class {
            Some(class) => anchor.with_class(class),
            None => anchor,
        })
    }
}

impl TryFrom<String> for Anchor {
    type Error = AnnotateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}", self.tag, class),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// Inline marker element and the classes it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerClasses {
    /// Element name used for markers
    pub tag: String,
    pub modified_text: String,
    pub added_text: String,
    /// Whole-unit addition
    pub added_element: String,
}

impl Default for MarkerClasses {
    fn default() -> Self {
        Self {
            tag: "mark".to_string(),
            modified_text: "modified-text".to_string(),
            added_text: "added-text".to_string(),
            added_element: "added-element".to_string(),
        }
    }
}

impl MarkerClasses {
    /// Whether `class` is one of the engine's marker classes
    pub fn is_marker_class(&self, class: &str) -> bool {
        class == self.modified_text || class == self.added_text || class == self.added_element
    }
}

/// Configuration for document annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Tag names treated as comparable content units
    pub comparable_tags: Vec<String>,

    /// Main content anchors, tried in order
    pub content_anchors: Vec<Anchor>,

    /// Below this a new unit counts as added
    pub min_similarity: f64,

    /// At or above this a unit counts as unchanged
    pub max_similarity: f64,

    /// Whole-document similarity at or above which the document is not
    /// reported as substantially changed
    pub document_gate: f64,

    /// Algorithm used for word alignment
    pub algorithm: DiffAlgorithm,

    pub markers: MarkerClasses,

    /// Attach the replaced text to modified markers as a `title`
    pub emit_provenance: bool,

    /// Class appended to changed navigation entries
    pub reference_class: String,

    /// Link-like elements considered by the reference flagger
    pub link_tags: Vec<String>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotateConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            comparable_tags: ["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote"]
                .into_iter()
                .map(String::from)
                .collect(),
            content_anchors: vec![Anchor::new("main"), Anchor::new("div").with_class("content")],
            min_similarity: 0.5,
            max_similarity: 0.99,
            document_gate: 0.95,
            algorithm: DiffAlgorithm::default(),
            markers: MarkerClasses::default(),
            emit_provenance: true,
            reference_class: "changed-reference".to_string(),
            link_tags: vec!["a".to_string()],
        }
    }

    /// Load a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds and lists for consistency
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_similarity", self.min_similarity),
            ("max_similarity", self.max_similarity),
            ("document_gate", self.document_gate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnnotateError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.min_similarity > self.max_similarity {
            return Err(AnnotateError::InvalidConfig(format!(
                "min_similarity ({}) exceeds max_similarity ({})",
                self.min_similarity, self.max_similarity
            )));
        }
        if self.comparable_tags.is_empty() {
            return Err(AnnotateError::InvalidConfig(
                "comparable_tags must not be empty".to_string(),
            ));
        }
        if self.markers.tag.is_empty() {
            return Err(AnnotateError::InvalidConfig("marker tag must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether `name` (lowercase) is a comparable unit tag
    pub fn is_comparable(&self, name: &str) -> bool {
        self.comparable_tags.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Replace the comparable tag whitelist
    pub fn with_comparable_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comparable_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_anchors(mut self, anchors: Vec<Anchor>) -> Self {
        self.content_anchors = anchors;
        self
    }

    /// Set both matcher thresholds
    pub fn with_thresholds(mut self, min: f64, max: f64) -> Self {
        self.min_similarity = min;
        self.max_similarity = max;
        self
    }

    pub fn with_document_gate(mut self, gate: f64) -> Self {
        self.document_gate = gate;
        self
    }

    pub fn with_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_markers(mut self, markers: MarkerClasses) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_provenance(mut self, emit: bool) -> Self {
        self.emit_provenance = emit;
        self
    }

    pub fn with_reference_class(mut self, class: impl Into<String>) -> Self {
        self.reference_class = class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_tag;

    #[test]
    fn test_default_config() {
        let config = AnnotateConfig::default();
        assert_eq!(config.algorithm, DiffAlgorithm::Myers);
        assert_eq!(config.min_similarity, 0.5);
        assert_eq!(config.max_similarity, 0.99);
        assert_eq!(config.document_gate, 0.95);
        assert!(config.is_comparable("blockquote"));
        assert!(!config.is_comparable("pre"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = AnnotateConfig::new()
            .with_algorithm(DiffAlgorithm::Lcs)
            .with_thresholds(0.4, 0.9)
            .with_comparable_tags(["p", "dd"]);

        assert_eq!(config.algorithm, DiffAlgorithm::Lcs);
        assert_eq!(config.min_similarity, 0.4);
        assert!(config.is_comparable("dd"));
        assert!(!config.is_comparable("li"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = AnnotateConfig::new().with_thresholds(0.9, 0.5);
        assert!(config.validate().is_err());

        let config = AnnotateConfig::new().with_document_gate(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = AnnotateConfig::from_toml_str(
            r#"
            min_similarity = 0.6
            content_anchors = ["article", "div.body"]
            algorithm = "lcs"

            [markers]
            modified_text = "changed"
            "#,
        )
        .unwrap();

        assert_eq!(config.min_similarity, 0.6);
        assert_eq!(config.max_similarity, 0.99);
        assert_eq!(config.algorithm, DiffAlgorithm::Lcs);
        assert_eq!(config.content_anchors[1], Anchor::new("div").with_class("body"));
        assert_eq!(config.markers.modified_text, "changed");
        assert_eq!(config.markers.added_text, "added-text");
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(AnnotateConfig::from_toml_str("min_similarity = \"high\"").is_err());
        assert!(AnnotateConfig::from_toml_str("content_anchors = [\".x\"]").is_err());
    }

    #[test]
    fn test_anchor_matching() {
        let anchor: Anchor = "div.content".parse().unwrap();
        assert_eq!(anchor.to_string(), "div.content");
        assert!(anchor.matches(&parse_tag("<div class=\"page content\">").unwrap()));
        assert!(!anchor.matches(&parse_tag("<div class=\"contents\">").unwrap()));
        assert!(Anchor::new("main").matches(&parse_tag("<main id=\"m\">").unwrap()));
    }
}
