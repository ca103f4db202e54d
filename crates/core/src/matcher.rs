//! Greedy unit matcher
//!
//! New units are visited in document order. Each one is scored against every
//! old unit not yet claimed by an earlier modification, and the best candidate
//! decides its verdict. The result is a partial matching: no old unit and no
//! new unit appears in more than one [`MatchedPair`].

use crate::extract::ContentUnit;
use crate::metrics::{ratio_upper_bound, sequence_ratio};
use serde::Serialize;
use std::collections::BTreeSet;

/// Association between one old unit and one new unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchedPair {
    pub old_index: usize,
    pub new_index: usize,
    pub similarity: f64,
}

/// Classification of a single new unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitVerdict {
    /// No visible text; never matched, never highlighted
    Empty,
    /// Best candidate reached the upper threshold
    Unchanged { old_index: usize, similarity: f64 },
    Modified(MatchedPair),
    /// No candidate reached the lower threshold
    Added,
}

impl UnitVerdict {
    pub fn is_change(&self) -> bool {
        matches!(self, UnitVerdict::Modified(_) | UnitVerdict::Added)
    }
}

/// Result of matching one document pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Modified pairs in new-document order
    pub pairs: Vec<MatchedPair>,
    /// Indices of new units treated as added
    pub added: Vec<usize>,
    /// One verdict per new unit
    pub verdicts: Vec<UnitVerdict>,
}

impl MatchOutcome {
    pub fn changed_count(&self) -> usize {
        self.pairs.len() + self.added.len()
    }
}

/// Best old candidate found for a new unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub old_index: usize,
    pub similarity: f64,
}

/// Threshold-based unit matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitMatcher {
    min_similarity: f64,
    max_similarity: f64,
}

impl Default for UnitMatcher {
    fn default() -> Self {
        Self::new(0.5, 0.99)
    }
}

impl UnitMatcher {
    pub fn new(min_similarity: f64, max_similarity: f64) -> Self {
        Self {
            min_similarity,
            max_similarity,
        }
    }

    /// Match new units against old units
    pub fn match_units(&self, old: &[ContentUnit], new: &[ContentUnit]) -> MatchOutcome {
        let old_chars: Vec<Vec<char>> = old.iter().map(comparable_chars).collect();
        let mut used = BTreeSet::new();
        let mut outcome = MatchOutcome::default();

        for (new_index, unit) in new.iter().enumerate() {
            if unit.is_empty() {
                outcome.verdicts.push(UnitVerdict::Empty);
                continue;
            }

            let chars = comparable_chars(unit);
            let verdict = match self.best_candidate(&chars, old, &old_chars, &used) {
                Some(best) if best.similarity >= self.max_similarity => UnitVerdict::Unchanged {
                    old_index: best.old_index,
                    similarity: best.similarity,
                },
                Some(best) if best.similarity >= self.min_similarity => {
                    used.insert(best.old_index);
                    let pair = MatchedPair {
                        old_index: best.old_index,
                        new_index,
                        similarity: best.similarity,
                    };
                    outcome.pairs.push(pair);
                    UnitVerdict::Modified(pair)
                }
                _ => {
                    outcome.added.push(new_index);
                    UnitVerdict::Added
                }
            };

            tracing::debug!(new_index, ?verdict, "unit classified");
            outcome.verdicts.push(verdict);
        }

        outcome
    }

    /// Highest-scoring old unit outside `used`; ties keep the earliest.
    ///
    /// Scores are character-level ratios over the trimmed text projections.
    pub fn best_candidate(
        &self,
        chars: &[char],
        old: &[ContentUnit],
        old_chars: &[Vec<char>],
        used: &BTreeSet<usize>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for (old_index, (unit, candidate)) in old.iter().zip(old_chars).enumerate() {
            if unit.is_empty() || used.contains(&old_index) {
                continue;
            }
            if let Some(current) = best {
                if ratio_upper_bound(chars.len(), candidate.len()) <= current.similarity {
                    continue;
                }
            }

            let similarity = sequence_ratio(chars, candidate);
            if best.map_or(true, |current| similarity > current.similarity) {
                best = Some(Candidate {
                    old_index,
                    similarity,
                });
            }
        }

        best
    }
}

/// Characters of a unit's trimmed text projection
pub fn comparable_chars(unit: &ContentUnit) -> Vec<char> {
    unit.comparable_text().chars().collect()
}
