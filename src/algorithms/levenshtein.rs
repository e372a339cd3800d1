//! Levenshtein (edit) distance
//!
//! Single-row DP over Unicode scalar values with an optional distance
//! bound for early termination. Catalog strings are short (product names
//! plus a spec line), so the row lives on the stack for typical inputs.

use super::EditDistance;
use smallvec::SmallVec;

type CharBuf = SmallVec<[char; 64]>;

/// DP distance over char slices.
#[inline]
fn dp_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Shorter string on the column axis keeps the row small
    let (cols, rows) = if a.len() < b.len() { (a, b) } else { (b, a) };
    let mut row: SmallVec<[usize; 64]> = (0..=cols.len()).collect();

    for (i, &rc) in rows.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;

        for (j, &cc) in cols.iter().enumerate() {
            let cost = usize::from(rc != cc);
            let cell = (diag + cost).min(row[j + 1] + 1).min(row[j] + 1);
            diag = row[j + 1];
            row[j + 1] = cell;
        }
    }

    row[cols.len()]
}

/// DP distance that gives up once every cell of a row exceeds `max_distance`.
#[inline]
fn dp_distance_bounded(a: &[char], b: &[char], max_distance: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max_distance {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        return Some(a.len().max(b.len()));
    }

    let (cols, rows) = if a.len() < b.len() { (a, b) } else { (b, a) };
    let mut row: SmallVec<[usize; 64]> = (0..=cols.len()).collect();

    for (i, &rc) in rows.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for (j, &cc) in cols.iter().enumerate() {
            let cost = usize::from(rc != cc);
            let cell = (diag + cost).min(row[j + 1] + 1).min(row[j] + 1);
            diag = row[j + 1];
            row[j + 1] = cell;
            row_min = row_min.min(cell);
        }

        if row_min > max_distance {
            return None;
        }
    }

    let result = row[cols.len()];
    (result <= max_distance).then_some(result)
}

/// Levenshtein distance calculator with optional early termination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Levenshtein {
    /// Maximum distance to compute (for early termination)
    pub max_distance: Option<usize>,
}

impl Levenshtein {
    #[must_use]
    pub fn new() -> Self {
        Self { max_distance: None }
    }

    #[must_use]
    pub fn with_max_distance(max_distance: usize) -> Self {
        Self {
            max_distance: Some(max_distance),
        }
    }

    /// Returns `None` if the distance exceeds the configured bound.
    #[must_use]
    pub fn compute(&self, a: &str, b: &str) -> Option<usize> {
        levenshtein_bounded(a, b, self.max_distance)
    }
}

impl EditDistance for Levenshtein {
    fn distance(&self, a: &str, b: &str) -> usize {
        match self.max_distance {
            Some(max_d) => levenshtein_bounded(a, b, Some(max_d)).unwrap_or(max_d.saturating_add(1)),
            None => levenshtein(a, b),
        }
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Levenshtein distance with an optional upper bound.
///
/// ```
/// use skumatch::algorithms::levenshtein::levenshtein_bounded;
///
/// assert_eq!(levenshtein_bounded("kitten", "sitting", None), Some(3));
/// assert_eq!(levenshtein_bounded("abcdef", "ghijkl", Some(3)), None);
/// ```
#[inline]
#[must_use]
pub fn levenshtein_bounded(a: &str, b: &str, max_distance: Option<usize>) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    let a_chars: CharBuf = a.chars().collect();
    let b_chars: CharBuf = b.chars().collect();
    match max_distance {
        Some(max_d) => dp_distance_bounded(&a_chars, &b_chars, max_d),
        None => Some(dp_distance(&a_chars, &b_chars)),
    }
}

/// Plain edit distance between two strings.
#[inline]
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a_chars: CharBuf = a.chars().collect();
    let b_chars: CharBuf = b.chars().collect();
    dp_distance(&a_chars, &b_chars)
}

/// `1 - distance / max(len)`; two empty strings are identical.
#[inline]
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// True when `distance(a, b) < ratio * max(len)`.
///
/// Used for fuzzy token expansion, where most pairs are far apart and
/// the bounded DP bails out after a row or two.
#[must_use]
pub fn within_relative_distance(a: &str, b: &str, ratio: f64) -> bool {
    let a_chars: CharBuf = a.chars().collect();
    let b_chars: CharBuf = b.chars().collect();
    let limit = ratio * a_chars.len().max(b_chars.len()) as f64;
    if limit <= 0.0 {
        return false;
    }
    // Largest integer strictly below `limit`
    let max_d = (limit.ceil() as usize).saturating_sub(1);
    match dp_distance_bounded(&a_chars, &b_chars, max_d) {
        Some(d) => (d as f64) < limit,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_cjk_counts_chars_not_bytes() {
        assert_eq!(levenshtein("普通产品", "另一个产品"), 3);
        assert!((levenshtein_similarity("普通产品", "另一个产品") - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_matches_unbounded_within_limit() {
        assert_eq!(levenshtein_bounded("chm2-3ze", "chm2-2ze", Some(1)), Some(1));
        assert_eq!(levenshtein_bounded("chm2-3ze", "chm2-2ze", Some(0)), None);
        assert_eq!(levenshtein_bounded("abc", "abcdefg", Some(2)), None);
    }

    #[test]
    fn test_levenshtein_struct_bound() {
        let lev = Levenshtein::with_max_distance(2);
        assert_eq!(lev.compute("abcdef", "ghijkl"), None);
        assert_eq!(EditDistance::distance(&lev, "abcdef", "ghijkl"), 3);
        assert_eq!(EditDistance::distance(&Levenshtein::new(), "abc", "abd"), 1);
    }

    #[test]
    fn test_within_relative_distance() {
        // 1 edit over 8 chars: 1 < 2.4
        assert!(within_relative_distance("controls", "control1", 0.3));
        // 2 edits over 4 chars: 2 >= 1.2
        assert!(!within_relative_distance("abcd", "abxy", 0.3));
        // 3 edits over 10 chars: 3 is not < 3.0
        assert!(!within_relative_distance("abcdefghij", "abcdefgxyz", 0.3));
    }
}
