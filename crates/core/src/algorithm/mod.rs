//! Sequence alignment algorithms
//!
//! Both algorithms return the index pairs of a longest common subsequence,
//! strictly increasing on both sides. Turning those pairs into edit runs is
//! the job of [`crate::diff::opcodes`].

pub mod myers;

pub use myers::MyersAlgorithm;

use crate::config;

/// Trait for sequence alignment algorithms
pub trait DiffAlgorithm {
    /// Matched `(original, modified)` index pairs of a common subsequence
    fn matching_pairs<T: PartialEq>(&self, original: &[T], modified: &[T]) -> Vec<(usize, usize)>;

    /// Length of the longest common subsequence
    fn lcs_len<T: PartialEq>(&self, original: &[T], modified: &[T]) -> usize {
        self.matching_pairs(original, modified).len()
    }
}

/// Classic dynamic-programming LCS
#[derive(Debug, Clone, Copy, Default)]
pub struct LcsAlgorithm;

impl DiffAlgorithm for LcsAlgorithm {
    fn matching_pairs<T: PartialEq>(&self, original: &[T], modified: &[T]) -> Vec<(usize, usize)> {
        let (prefix, suffix) = common_affixes(original, modified);
        let middle = longest_common_subsequence(
            &original[prefix..original.len() - suffix],
            &modified[prefix..modified.len() - suffix],
        );
        stitch(prefix, suffix, original.len(), modified.len(), middle)
    }
}

/// Run the configured algorithm
pub fn matching_pairs<T: PartialEq>(
    algorithm: config::DiffAlgorithm,
    original: &[T],
    modified: &[T],
) -> Vec<(usize, usize)> {
    match algorithm {
        config::DiffAlgorithm::Myers => MyersAlgorithm.matching_pairs(original, modified),
        config::DiffAlgorithm::Lcs => LcsAlgorithm.matching_pairs(original, modified),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Lengths of the shared prefix and (non-overlapping) shared suffix
pub(crate) fn common_affixes<T: PartialEq>(original: &[T], modified: &[T]) -> (usize, usize) {
    let prefix = original
        .iter()
        .zip(modified)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = original[prefix..]
        .iter()
        .rev()
        .zip(modified[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

/// Re-attach the trimmed prefix and suffix to pairs found in the middle
pub(crate) fn stitch(
    prefix: usize,
    suffix: usize,
    original_len: usize,
    modified_len: usize,
    middle: Vec<(usize, usize)>,
) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = (0..prefix).map(|i| (i, i)).collect();
    pairs.extend(middle.into_iter().map(|(i, j)| (i + prefix, j + prefix)));
    pairs.extend((0..suffix).map(|i| (original_len - suffix + i, modified_len - suffix + i)));
    pairs
}

fn longest_common_subsequence<T: PartialEq>(original: &[T], modified: &[T]) -> Vec<(usize, usize)> {
    let n = original.len();
    let m = modified.len();

    // DP table
    let mut dp = vec![vec![0usize; m + 1]; n + 1];

    for i in 1..=n {
        for j in 1..=m {
            if original[i - 1] == modified[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    // Backtrack to find LCS
    let mut lcs = Vec::new();
    let mut i = n;
    let mut j = m;

    while i > 0 && j > 0 {
        if original[i - 1] == modified[j - 1] {
            lcs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    lcs.reverse();
    lcs
}
