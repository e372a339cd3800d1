//! Evaluation metrics for assessing resolution quality.
//!
//! Scores a batch of lookups against hand-labelled expectations. Each
//! outcome pairs the id a human says the descriptor refers to (or none,
//! for items that are genuinely not in the catalog) with the id the
//! matcher returned.

use serde::{Deserialize, Serialize};

use crate::scoring::MatchResult;

/// Expected versus predicted entry for one labelled descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub expected: Option<String>,
    pub predicted: Option<String>,
}

impl ResolutionOutcome {
    pub fn new(expected: Option<&str>, predicted: Option<&str>) -> Self {
        Self {
            expected: expected.map(str::to_string),
            predicted: predicted.map(str::to_string),
        }
    }

    /// Pair a label with whatever a lookup returned.
    pub fn from_result(expected: Option<&str>, result: Option<&MatchResult>) -> Self {
        Self::new(expected, result.map(|r| r.entry_id.as_str()))
    }
}

/// Confusion matrix values for classification evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// Resolved to the expected entry
    pub true_positives: usize,
    /// Resolved to an entry that was not expected
    pub false_positives: usize,
    /// Expected entry was not returned
    pub false_negatives: usize,
    /// Correctly left unresolved
    pub true_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally outcomes. A wrong id counts as both a false positive and a
    /// false negative.
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut cm, outcome| {
            match (&outcome.expected, &outcome.predicted) {
                (Some(e), Some(p)) if e == p => cm.true_positives += 1,
                (Some(_), Some(_)) => {
                    cm.false_positives += 1;
                    cm.false_negatives += 1;
                }
                (None, Some(_)) => cm.false_positives += 1,
                (Some(_), None) => cm.false_negatives += 1,
                (None, None) => cm.true_negatives += 1,
            }
            cm
        })
    }

    /// Calculate precision from confusion matrix values.
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            if self.false_negatives == 0 {
                1.0 // No predictions and nothing to find
            } else {
                0.0
            }
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall from confusion matrix values.
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            if self.false_positives == 0 {
                1.0 // Nothing to find and nothing wrongly found
            } else {
                0.0
            }
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// F-beta score. `beta = 1.0` is F1; `beta < 1` weighs precision higher.
    pub fn f_score(&self, beta: f64) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            let beta_sq = beta * beta;
            (1.0 + beta_sq) * p * r / (beta_sq * p + r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<ResolutionOutcome> {
        vec![
            ResolutionOutcome::new(Some("1"), Some("1")),
            ResolutionOutcome::new(Some("2"), Some("2")),
            ResolutionOutcome::new(Some("3"), Some("4")),
            ResolutionOutcome::new(None, Some("5")),
            ResolutionOutcome::new(Some("6"), None),
            ResolutionOutcome::new(None, None),
        ]
    }

    #[test]
    fn test_from_outcomes() {
        let cm = ConfusionMatrix::from_outcomes(&outcomes());
        assert_eq!(cm.true_positives, 2);
        assert_eq!(cm.false_positives, 2);
        assert_eq!(cm.false_negatives, 2);
        assert_eq!(cm.true_negatives, 1);
    }

    #[test]
    fn test_precision_recall_f_score() {
        let cm = ConfusionMatrix::from_outcomes(&outcomes());
        assert_eq!(cm.precision(), 0.5);
        assert_eq!(cm.recall(), 0.5);
        assert!((cm.f_score(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_f_beta_weighting() {
        let cm = ConfusionMatrix {
            true_positives: 3,
            false_positives: 1,
            false_negatives: 3,
            true_negatives: 0,
        };
        // p = 0.75, r = 0.5
        assert!((cm.f_score(1.0) - 0.6).abs() < 1e-12);
        assert!(cm.f_score(0.5) > cm.f_score(1.0));
        assert!(cm.f_score(2.0) < cm.f_score(1.0));
    }

    #[test]
    fn test_empty() {
        let cm = ConfusionMatrix::from_outcomes(&[]);
        assert_eq!(cm, ConfusionMatrix::default());
        assert_eq!(cm.precision(), 1.0);
        assert_eq!(cm.recall(), 1.0);
        assert_eq!(cm.f_score(1.0), 1.0);
    }

    #[test]
    fn test_all_missed() {
        let cm = ConfusionMatrix::from_outcomes(&[ResolutionOutcome::new(Some("1"), None)]);
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f_score(1.0), 0.0);
    }

    #[test]
    fn test_from_result() {
        let result = MatchResult {
            entry_id: "9".to_string(),
            score: 1.0,
            match_type: crate::scoring::MatchType::ModelMatch,
        };
        let outcome = ResolutionOutcome::from_result(Some("9"), Some(&result));
        assert_eq!(outcome, ResolutionOutcome::new(Some("9"), Some("9")));
        assert_eq!(
            ResolutionOutcome::from_result(None, None),
            ResolutionOutcome::default()
        );
    }
}
