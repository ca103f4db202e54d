//! Similarity metrics
//!
//! All ratios are `2·M / T` where `M` is the length of a longest common
//! subsequence and `T` the combined length of both inputs. That makes them
//! symmetric, exactly 1.0 for identical inputs and 0.0 when nothing is shared.

use crate::algorithm::{DiffAlgorithm, MyersAlgorithm};
use crate::markup::{tokenize_markup, TokenKind};
use crate::tokenizers::tokenize;

/// Ratio over two sequences of comparable items
pub fn sequence_ratio<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = MyersAlgorithm.lcs_len(a, b);
    (2 * matches) as f64 / total as f64
}

/// Character-level similarity of two strings
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    sequence_ratio(&a, &b)
}

/// Upper bound of [`similarity_ratio`] from lengths alone
pub fn ratio_upper_bound(a_len: usize, b_len: usize) -> f64 {
    let total = a_len + b_len;
    if total == 0 {
        return 1.0;
    }
    (2 * a_len.min(b_len)) as f64 / total as f64
}

/// Word-level similarity of two strings (words and whitespace runs)
pub fn token_similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a = tokenize(a);
    let b = tokenize(b);
    let a: Vec<&str> = a.iter().map(|t| t.text.as_str()).collect();
    let b: Vec<&str> = b.iter().map(|t| t.text.as_str()).collect();
    sequence_ratio(&a, &b)
}

/// Normalize markup for whole-document comparison: comments dropped,
/// whitespace runs collapsed to one space, ends trimmed.
pub fn normalize_markup(markup: &str) -> String {
    let without_comments = match tokenize_markup(markup) {
        Ok(tokens) => tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .map(|t| t.raw(markup))
            .collect::<String>(),
        Err(_) => markup.to_string(),
    };
    without_comments.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-document similarity of two content regions
pub fn document_similarity(old: &str, new: &str) -> f64 {
    token_similarity_ratio(&normalize_markup(old), &normalize_markup(new))
}
