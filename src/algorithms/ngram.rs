//! Character bigram similarity
//!
//! Unpadded bigram sets compared with the Jaccard coefficient. A string
//! shorter than two characters contributes itself as its only gram, so
//! single-character names still have something to compare.

use super::Similarity;
use ahash::AHashSet;

/// Bigram Jaccard similarity calculator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BigramJaccard;

impl Similarity for BigramJaccard {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        bigram_jaccard_similarity(a, b)
    }

    fn name(&self) -> &'static str {
        "bigram_jaccard"
    }
}

/// Extract the set of character bigrams.
///
/// Empty input yields an empty set; a one-character input yields itself.
#[must_use]
pub fn extract_bigram_set(s: &str) -> AHashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        0 => AHashSet::new(),
        1 => std::iter::once(s.to_string()).collect(),
        _ => chars.windows(2).map(|w| w.iter().collect()).collect(),
    }
}

/// `|A ∩ B| / |A ∪ B|` over bigram sets.
#[must_use]
pub fn bigram_jaccard_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_grams = extract_bigram_set(a);
    let b_grams = extract_bigram_set(b);

    let intersection = a_grams.intersection(&b_grams).count();
    let union = a_grams.len() + b_grams.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
