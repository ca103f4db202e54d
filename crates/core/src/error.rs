//! Error types for the annotation engine
//!
//! Nothing here is fatal to a document: the orchestrator catches every
//! `AnnotateError`, logs it, and falls back to passing markup through.

use thiserror::Error;

/// Result type alias using `AnnotateError`
pub type Result<T> = std::result::Result<T, AnnotateError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnnotateError {
    /// Markup could not be tokenized or its tags cannot be paired
    #[error("malformed markup at byte {offset}: {reason}")]
    MalformedMarkup { offset: usize, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl AnnotateError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedMarkup {
            offset,
            reason: reason.into(),
        }
    }

    /// Whether this error came from the markup itself rather than configuration
    pub fn is_malformed_markup(&self) -> bool {
        matches!(self, Self::MalformedMarkup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = AnnotateError::malformed(12, "unterminated tag");
        assert_eq!(err.to_string(), "malformed markup at byte 12: unterminated tag");
        assert!(err.is_malformed_markup());
    }

    #[test]
    fn test_config_error_is_not_markup() {
        let err = AnnotateError::InvalidConfig("empty tag list".to_string());
        assert!(!err.is_malformed_markup());
    }
}
