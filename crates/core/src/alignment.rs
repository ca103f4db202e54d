//! Word-level alignment of a modified unit
//!
//! Produces the ranges of the new text that differ from the old text.
//! Replacements carry the old text they replaced; insertions carry nothing;
//! deletions produce no range since nothing in the new text can hold them.

use crate::algorithm::matching_pairs;
use crate::config::DiffAlgorithm;
use crate::diff::{opcodes, ChangeRange, EditType};
use crate::mapping::CharSpan;
use crate::tokenizers::{Token, Tokenizer, WordTokenizer};

/// Aligns two plain-text projections token by token
#[derive(Clone)]
pub struct WordAligner {
    tokenizer: Box<dyn Tokenizer>,
    algorithm: DiffAlgorithm,
}

impl Default for WordAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl WordAligner {
    pub fn new() -> Self {
        Self {
            tokenizer: Box::new(WordTokenizer::new()),
            algorithm: DiffAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Swap the tokenizer, e.g. for character-level highlighting
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Change ranges over `new_text`, sorted and non-overlapping
    pub fn align(&self, old_text: &str, new_text: &str) -> Vec<ChangeRange> {
        let old_tokens = self.tokenizer.tokenize(old_text);
        let new_tokens = self.tokenizer.tokenize(new_text);
        let old_values: Vec<&str> = old_tokens.iter().map(|t| t.text.as_str()).collect();
        let new_values: Vec<&str> = new_tokens.iter().map(|t| t.text.as_str()).collect();

        let pairs = matching_pairs(self.algorithm, &old_values, &new_values);
        let mut ranges = Vec::new();

        for op in opcodes(&pairs, old_values.len(), new_values.len()) {
            match op.tag {
                EditType::Replace => {
                    let previous = run_text(old_text, &old_tokens[op.original]);
                    ranges.push(ChangeRange::modified(run_span(&new_tokens[op.modified]), previous));
                }
                EditType::Insert => ranges.push(ChangeRange::added(run_span(&new_tokens[op.modified]))),
                EditType::Delete | EditType::Equal => {}
            }
        }

        tracing::trace!(
            tokenizer = self.tokenizer.name(),
            ranges = ranges.len(),
            "aligned unit text"
        );
        ranges
    }
}

/// Span covered by a non-empty run of consecutive tokens
fn run_span(run: &[Token]) -> CharSpan {
    match (run.first(), run.last()) {
        (Some(first), Some(last)) => CharSpan::new(first.span.start, last.span.end),
        _ => CharSpan::default(),
    }
}

fn run_text<'a>(text: &'a str, run: &[Token]) -> &'a str {
    let span = run_span(run);
    &text[span.start..span.end]
}
