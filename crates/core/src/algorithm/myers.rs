use crate::algorithm::{common_affixes, stitch, DiffAlgorithm};

/// Myers O(ND) diff algorithm
///
/// Keeps only the slice of the frontier each step can read back during path
/// recovery, so memory grows with the square of the edit distance rather
/// than with the product of the input lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersAlgorithm;

impl MyersAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

impl DiffAlgorithm for MyersAlgorithm {
    fn matching_pairs<T: PartialEq>(&self, original: &[T], modified: &[T]) -> Vec<(usize, usize)> {
        let (prefix, suffix) = common_affixes(original, modified);
        let middle = shortest_edit_pairs(
            &original[prefix..original.len() - suffix],
            &modified[prefix..modified.len() - suffix],
        );
        stitch(prefix, suffix, original.len(), modified.len(), middle)
    }

    fn lcs_len<T: PartialEq>(&self, original: &[T], modified: &[T]) -> usize {
        let (prefix, suffix) = common_affixes(original, modified);
        let a = &original[prefix..original.len() - suffix];
        let b = &modified[prefix..modified.len() - suffix];
        let distance = edit_distance(a, b);
        prefix + suffix + (a.len() + b.len() - distance) / 2
    }
}

/// Number of insertions plus deletions on a shortest edit path
fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let n = a.len() as isize;
    let m = b.len() as isize;
    if n == 0 || m == 0 {
        return (n + m) as usize;
    }

    let max = n + m;
    let offset = max + 1;
    let mut v = vec![0isize; (2 * max + 3) as usize];

    for d in 0..=max {
        let mut k = -d;
        while k <= d {
            let x = advance(a, b, &mut v, offset, d, k);
            if x >= n && x - k >= m {
                return d as usize;
            }
            k += 2;
        }
    }
    max as usize
}

fn shortest_edit_pairs<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let max = n + m;
    let offset = max + 1;
    let mut v = vec![0isize; (2 * max + 3) as usize];
    // trace[d] holds v[-(d+1)..=d+1] as it was before step d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        let lo = (offset - d - 1) as usize;
        let hi = (offset + d + 1) as usize;
        trace.push(v[lo..=hi].to_vec());

        let mut k = -d;
        while k <= d {
            let x = advance(a, b, &mut v, offset, d, k);
            if x >= n && x - k >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut pairs = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, snapshot) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let at = |k: isize| snapshot[(k + d + 1) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            pairs.push((x as usize, y as usize));
        }

        if d > 0 {
            x = prev_x;
            y = prev_y;
        }
    }

    pairs.reverse();
    pairs
}

/// One step of the greedy frontier on diagonal `k`; returns the furthest x
fn advance<T: PartialEq>(a: &[T], b: &[T], v: &mut [isize], offset: isize, d: isize, k: isize) -> isize {
    let idx = (offset + k) as usize;
    let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
        v[idx + 1]
    } else {
        v[idx - 1] + 1
    };
    let mut y = x - k;
    while x < a.len() as isize && y < b.len() as isize && a[x as usize] == b[y as usize] {
        x += 1;
        y += 1;
    }
    v[idx] = x;
    x
}

#[cfg(test)]
mod tests {
    use super::super::tests::chars;
    use super::*;

    fn common(a: &str, b: &str) -> String {
        let a = chars(a);
        let pairs = MyersAlgorithm.matching_pairs(&a, &chars(b));
        pairs.iter().map(|&(i, _)| a[i]).collect()
    }

    #[test]
    fn test_myers_basic() {
        assert_eq!(common("The cat sat.", "The cat slept."), "The cat st.");
    }

    #[test]
    fn test_all_deletions() {
        assert!(MyersAlgorithm.matching_pairs(&chars("hello"), &chars("")).is_empty());
        assert_eq!(MyersAlgorithm.lcs_len(&chars("hello"), &chars("")), 0);
    }

    #[test]
    fn test_all_insertions() {
        assert!(MyersAlgorithm.matching_pairs(&chars(""), &chars("hello")).is_empty());
    }

    #[test]
    fn test_identical() {
        let a = chars("identical");
        let pairs = MyersAlgorithm.matching_pairs(&a, &a);
        assert_eq!(pairs, (0..a.len()).map(|i| (i, i)).collect::<Vec<_>>());
        assert_eq!(MyersAlgorithm.lcs_len(&a, &a), a.len());
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(MyersAlgorithm.lcs_len(&chars("abc"), &chars("xyz")), 0);
        assert!(MyersAlgorithm.matching_pairs(&chars("abc"), &chars("xyz")).is_empty());
    }

    #[test]
    fn test_pairs_are_matches_and_increasing() {
        let a = chars("ABCABBA");
        let b = chars("CBABAC");
        let pairs = MyersAlgorithm.matching_pairs(&a, &b);
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|&(i, j)| a[i] == b[j]));
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        assert_eq!(MyersAlgorithm.lcs_len(&a, &b), 4);
    }

    #[test]
    fn test_tokens() {
        let a = ["The", " ", "cat", " ", "sat."];
        let b = ["The", " ", "cat", " ", "slept."];
        let pairs = MyersAlgorithm.matching_pairs(&a, &b);
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }
}
