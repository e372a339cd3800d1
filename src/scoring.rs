//! Match scoring
//!
//! A descriptor is scored against each candidate with a fixed, ordered set
//! of strategies. Every strategy either produces a score or stays silent
//! when its activation condition is not met; the candidate's score is the
//! best one produced. Candidates below the threshold are dropped and the
//! best remaining candidate wins, first in catalog order on ties.
//!
//! | Strategy          | Range       |
//! |-------------------|-------------|
//! | Model match       | 0.95 – 1.0  |
//! | Spec containment  | 0.85 – 0.90 |
//! | Name containment  | 0.55 – 0.80 |
//! | Bigram Jaccard    | 0.15 – 0.50 |
//! | Edit distance     | 0.225 – 0.45 |

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithms::{char_len, BigramJaccard, Levenshtein, NormalizationMode, Similarity};
use crate::catalog::{CatalogEntry, Descriptor, NormalizedText};
use crate::extract::find_matching_model;

/// Candidate count above which scoring fans out over the rayon pool.
const PARALLEL_THRESHOLD: usize = 100;

/// Which strategy produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Both sides share a model number
    ModelMatch,
    /// The query's specification appears in the candidate
    SpecContains,
    /// One side's text contains the other's
    NameContains,
    /// Character bigram overlap
    NgramSimilarity,
    /// Levenshtein similarity
    EditDistance,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::ModelMatch => "MODEL_MATCH",
            MatchType::SpecContains => "SPEC_CONTAINS",
            MatchType::NameContains => "NAME_CONTAINS",
            MatchType::NgramSimilarity => "NGRAM_SIMILARITY",
            MatchType::EditDistance => "EDIT_DISTANCE",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a descriptor against a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry_id: String,
    /// Score in [0.0, 1.0]
    pub score: f64,
    pub match_type: MatchType,
}

/// One strategy's contribution for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyScore {
    pub match_type: MatchType,
    pub score: f64,
}

type Strategy = fn(&NormalizedText, &NormalizedText) -> Option<f64>;

/// Evaluation order; on equal scores the earlier strategy is reported.
const STRATEGIES: [(MatchType, Strategy); 5] = [
    (MatchType::ModelMatch, model_match),
    (MatchType::SpecContains, spec_containment),
    (MatchType::NameContains, name_containment),
    (MatchType::NgramSimilarity, ngram_similarity),
    (MatchType::EditDistance, edit_distance_similarity),
];

fn model_match(query: &NormalizedText, candidate: &NormalizedText) -> Option<f64> {
    let model = find_matching_model(&query.combined, &candidate.combined)?;
    // Combined text is lower-case; extracted models are upper-case
    let needle = model.to_lowercase();
    if query.combined.contains(&needle) && candidate.combined.contains(&needle) {
        Some(1.0)
    } else {
        Some(0.95)
    }
}

fn spec_containment(query: &NormalizedText, candidate: &NormalizedText) -> Option<f64> {
    let spec = &query.specifications;
    if spec.is_empty() || !candidate.combined.contains(spec.as_str()) {
        return None;
    }
    let ratio = char_len(spec) as f64 / char_len(&candidate.combined) as f64;
    Some(0.85 + 0.05 * ratio)
}

fn name_containment(query: &NormalizedText, candidate: &NormalizedText) -> Option<f64> {
    let q_len = char_len(&query.combined);
    let c_len = char_len(&candidate.combined);
    let (min_len, max_len) = (q_len.min(c_len), q_len.max(c_len));
    if max_len == 0 {
        return None;
    }

    let length_ratio = min_len as f64 / max_len as f64;
    let required = if min_len < 5 {
        0.8
    } else if min_len < 10 {
        0.7
    } else {
        0.6
    };
    if length_ratio < required {
        return None;
    }

    if query.combined.contains(candidate.combined.as_str()) {
        Some(0.65 + 0.15 * length_ratio)
    } else if candidate.combined.contains(query.combined.as_str()) {
        Some(0.55 + 0.15 * length_ratio)
    } else {
        None
    }
}

/// Weighted similarity that only counts above its activation floor.
fn weighted<S: Similarity>(metric: &S, a: &str, b: &str, weight: f64, floor: f64) -> Option<f64> {
    let sim = metric.similarity(a, b);
    (sim > floor).then(|| sim * weight)
}

fn ngram_similarity(query: &NormalizedText, candidate: &NormalizedText) -> Option<f64> {
    weighted(&BigramJaccard, &query.combined, &candidate.combined, 0.5, 0.3)
}

fn edit_distance_similarity(query: &NormalizedText, candidate: &NormalizedText) -> Option<f64> {
    weighted(&Levenshtein::new(), &query.combined, &candidate.combined, 0.45, 0.5)
}

/// Every strategy that fired, in evaluation order.
pub fn explain(query: &NormalizedText, candidate: &NormalizedText) -> Vec<StrategyScore> {
    STRATEGIES
        .iter()
        .filter_map(|(match_type, strategy)| {
            strategy(query, candidate).map(|score| StrategyScore {
                match_type: *match_type,
                score,
            })
        })
        .collect()
}

/// Best strategy for one candidate, or `None` if nothing fired.
pub fn evaluate(query: &NormalizedText, candidate: &NormalizedText) -> Option<StrategyScore> {
    explain(query, candidate)
        .into_iter()
        .fold(None, |best: Option<StrategyScore>, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(s),
        })
}

/// Scores descriptors against catalog entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scorer {
    mode: NormalizationMode,
}

impl Scorer {
    pub fn new(mode: NormalizationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    /// Score one candidate. Blank entries never score.
    pub fn score_entry(&self, query: &NormalizedText, entry: &CatalogEntry) -> Option<StrategyScore> {
        let candidate = NormalizedText::new(&entry.name, &entry.specifications, self.mode);
        if candidate.is_blank() {
            return None;
        }
        evaluate(query, &candidate)
    }

    /// Best candidate at or above `threshold`.
    pub fn best_match(
        &self,
        query: &Descriptor,
        candidates: &[CatalogEntry],
        threshold: f64,
    ) -> Option<MatchResult> {
        let refs: Vec<&CatalogEntry> = candidates.iter().collect();
        self.best_match_among(&query.normalized(self.mode), &refs, threshold)
    }

    /// Best candidate among borrowed entries, in the order given. A NaN or
    /// infinite threshold matches nothing.
    pub fn best_match_among(
        &self,
        query: &NormalizedText,
        candidates: &[&CatalogEntry],
        threshold: f64,
    ) -> Option<MatchResult> {
        if query.is_blank() || candidates.is_empty() || !threshold.is_finite() {
            return None;
        }

        let scores: Vec<Option<StrategyScore>> = if candidates.len() > PARALLEL_THRESHOLD {
            candidates
                .par_iter()
                .map(|entry| self.score_entry(query, entry))
                .collect()
        } else {
            candidates
                .iter()
                .map(|entry| self.score_entry(query, entry))
                .collect()
        };

        // Sequential reduction keeps first-seen-wins on ties
        let mut best: Option<(usize, StrategyScore)> = None;
        for (i, score) in scores.into_iter().enumerate() {
            let Some(score) = score else { continue };
            if score.score < threshold {
                continue;
            }
            if best.map_or(true, |(_, b)| score.score > b.score) {
                best = Some((i, score));
            }
        }

        best.map(|(i, s)| MatchResult {
            entry_id: candidates[i].id.clone(),
            score: s.score,
            match_type: s.match_type,
        })
    }
}

/// Direct, unindexed scoring of a descriptor against `candidates`.
///
/// ```
/// use skumatch::{find_best_match, CatalogEntry, MatchType};
///
/// let catalog = vec![CatalogEntry::new("4", "iPhone 14").with_specifications("128GB")];
/// let result = find_best_match("iPhone 14 Pro", "", &catalog, 0.5).unwrap();
/// assert_eq!(result.entry_id, "4");
/// assert_eq!(result.match_type, MatchType::ModelMatch);
/// ```
pub fn find_best_match(
    name: &str,
    specifications: &str,
    candidates: &[CatalogEntry],
    threshold: f64,
) -> Option<MatchResult> {
    Scorer::default().best_match(&Descriptor::new(name, specifications), candidates, threshold)
}
