//! String similarity primitives used by the scorer and the token index
//!
//! Each algorithm is a standalone function for composability, plus a
//! trait-based interface so the scorer can run its fuzzy strategies
//! through one table.

pub mod levenshtein;
pub mod ngram;
pub mod normalize;

pub use levenshtein::*;
pub use ngram::*;
pub use normalize::*;

/// Trait for all similarity metrics.
/// Returns a value between 0.0 (completely different) and 1.0 (identical).
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Convenience method for distance (1.0 - similarity)
    fn distance(&self, a: &str, b: &str) -> f64 {
        1.0 - self.similarity(a, b)
    }

    /// Name of the algorithm for debugging/logging
    fn name(&self) -> &'static str;
}

/// Trait for edit distance algorithms that return integer distances
pub trait EditDistance: Send + Sync {
    fn distance(&self, a: &str, b: &str) -> usize;

    /// Convert to normalized similarity score (0.0 to 1.0)
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let dist = self.distance(a, b);
        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            1.0
        } else {
            1.0 - (dist as f64 / max_len as f64)
        }
    }

    fn name(&self) -> &'static str;
}

/// Any EditDistance is also a Similarity
impl<T: EditDistance> Similarity for T {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        EditDistance::similarity(self, a, b)
    }

    fn name(&self) -> &'static str {
        EditDistance::name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_blanket_similarity() {
        let lev = Levenshtein::new();
        let sim = Similarity::similarity(&lev, "abcd", "abce");
        assert!((sim - 0.75).abs() < 1e-12);
        assert_eq!(Similarity::name(&lev), "levenshtein");
    }

    #[test]
    fn test_similarity_distance_complement() {
        let jac = BigramJaccard;
        let d = Similarity::distance(&jac, "abc", "abc");
        assert_eq!(d, 0.0);
    }
}
