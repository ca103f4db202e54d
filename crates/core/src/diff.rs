//! Diff result types and structures

use crate::mapping::CharSpan;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Type of edit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditType {
    /// Content was inserted
    Insert,
    /// Content was deleted
    Delete,
    /// Content was replaced (delete + insert)
    Replace,
    /// Content remained unchanged
    Equal,
}

/// A labelled run over two sequences, in the style of difflib opcodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: EditType,
    pub original: Range<usize>,
    pub modified: Range<usize>,
}

impl Opcode {
    fn new(tag: EditType, original: Range<usize>, modified: Range<usize>) -> Self {
        Self {
            tag,
            original,
            modified,
        }
    }
}

/// Group matched index pairs into equal / replace / insert / delete runs.
///
/// `pairs` must be strictly increasing on both sides; `original_len` and
/// `modified_len` close the final gap.
pub fn opcodes(pairs: &[(usize, usize)], original_len: usize, modified_len: usize) -> Vec<Opcode> {
    let mut ops: Vec<Opcode> = Vec::new();
    let mut i = 0;
    let mut j = 0;

    for &(x, y) in pairs.iter().chain(std::iter::once(&(original_len, modified_len))) {
        if let Some(op) = gap(i..x, j..y) {
            ops.push(op);
        }
        if x == original_len && y == modified_len {
            break;
        }
        match ops.last_mut() {
            Some(last) if last.tag == EditType::Equal && last.original.end == x && last.modified.end == y => {
                last.original.end += 1;
                last.modified.end += 1;
            }
            _ => ops.push(Opcode::new(EditType::Equal, x..x + 1, y..y + 1)),
        }
        i = x + 1;
        j = y + 1;
    }

    ops
}

fn gap(original: Range<usize>, modified: Range<usize>) -> Option<Opcode> {
    match (original.is_empty(), modified.is_empty()) {
        (true, true) => None,
        (false, false) => Some(Opcode::new(EditType::Replace, original, modified)),
        (false, true) => Some(Opcode::new(EditType::Delete, original, modified)),
        (true, false) => Some(Opcode::new(EditType::Insert, original, modified)),
    }
}

/// Kind of change a highlighted range represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Modified,
    Added,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Added => write!(f, "added"),
        }
    }
}

/// A half-open byte range over a new unit's plain-text projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRange {
    pub span: CharSpan,
    pub kind: ChangeKind,
    /// Text this range replaced (modified ranges only)
    pub previous: Option<String>,
}

impl ChangeRange {
    pub fn modified(span: CharSpan, previous: impl Into<String>) -> Self {
        Self {
            span,
            kind: ChangeKind::Modified,
            previous: Some(previous.into()),
        }
    }

    pub fn added(span: CharSpan) -> Self {
        Self {
            span,
            kind: ChangeKind::Added,
            previous: None,
        }
    }

    /// Get a human-readable description of this range
    pub fn description(&self, text: &str) -> String {
        let current = text.get(self.span.start..self.span.end).unwrap_or_default();
        match (&self.kind, &self.previous) {
            (ChangeKind::Modified, Some(previous)) => {
                format!("Modify: \"{previous}\" → \"{current}\"")
            }
            _ => format!("{}: \"{}\"", self.kind, current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_replace() {
        // The cat sat. / The cat slept.
        let ops = opcodes(&[(0, 0), (1, 1), (2, 2), (3, 3)], 5, 5);
        assert_eq!(
            ops,
            vec![
                Opcode::new(EditType::Equal, 0..4, 0..4),
                Opcode::new(EditType::Replace, 4..5, 4..5),
            ]
        );
    }

    #[test]
    fn test_opcodes_insert_and_delete() {
        let ops = opcodes(&[(0, 0), (2, 3)], 3, 4);
        assert_eq!(
            ops,
            vec![
                Opcode::new(EditType::Equal, 0..1, 0..1),
                Opcode::new(EditType::Replace, 1..2, 1..3),
                Opcode::new(EditType::Equal, 2..3, 3..4),
            ]
        );

        let ops = opcodes(&[(1, 0)], 2, 2);
        assert_eq!(
            ops,
            vec![
                Opcode::new(EditType::Delete, 0..1, 0..0),
                Opcode::new(EditType::Equal, 1..2, 0..1),
                Opcode::new(EditType::Insert, 2..2, 1..2),
            ]
        );
    }

    #[test]
    fn test_opcodes_empty() {
        assert!(opcodes(&[], 0, 0).is_empty());
        assert_eq!(opcodes(&[], 0, 3), vec![Opcode::new(EditType::Insert, 0..0, 0..3)]);
    }

    #[test]
    fn test_change_range_description() {
        let text = "The cat slept.";
        let range = ChangeRange::modified(CharSpan::new(8, 14), "sat.");
        assert_eq!(range.description(text), "Modify: \"sat.\" → \"slept.\"");
        let added = ChangeRange::added(CharSpan::new(0, 3));
        assert_eq!(added.description(text), "added: \"The\"");
    }
}
