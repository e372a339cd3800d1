//! Matcher configuration

use serde::{Deserialize, Serialize};

use crate::algorithms::NormalizationMode;
use crate::error::{validate_threshold, MatcherError, Result};

/// Default minimum score for a candidate to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Default number of cached lookups.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default upper bound on distinct tokens kept in the inverted index.
pub const DEFAULT_MAX_INDEX_TOKENS: usize = 5000;

/// Configuration for a [`CatalogMatcher`](crate::CatalogMatcher).
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// # use skumatch::MatcherConfig;
/// let config = MatcherConfig::default().with_cache_capacity(200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Threshold used by `CatalogMatcher::resolve` and `find_duplicates`
    pub default_threshold: f64,
    /// Maximum number of cached lookup results
    pub cache_capacity: usize,
    /// Maximum number of distinct tokens in the inverted index
    pub max_index_tokens: usize,
    /// Text normalization applied to descriptors and catalog entries
    pub normalization: NormalizationMode,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_index_tokens: DEFAULT_MAX_INDEX_TOKENS,
            normalization: NormalizationMode::Standard,
        }
    }
}

impl MatcherConfig {
    #[must_use]
    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_max_index_tokens(mut self, limit: usize) -> Self {
        self.max_index_tokens = limit;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.default_threshold)?;
        if self.cache_capacity == 0 {
            return Err(MatcherError::ZeroCacheCapacity);
        }
        if self.max_index_tokens == 0 {
            return Err(MatcherError::ZeroTokenLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.default_threshold, 0.6);
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.max_index_tokens, 5000);
        assert_eq!(config.normalization, NormalizationMode::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = MatcherConfig::default().with_cache_capacity(0);
        assert_eq!(config.validate(), Err(MatcherError::ZeroCacheCapacity));

        let config = MatcherConfig::default().with_max_index_tokens(0);
        assert_eq!(config.validate(), Err(MatcherError::ZeroTokenLimit));

        let config = MatcherConfig::default().with_default_threshold(2.0);
        assert_eq!(config.validate(), Err(MatcherError::InvalidThreshold(2.0)));
    }

    #[test]
    fn test_partial_json() {
        let config: MatcherConfig =
            serde_json::from_str(r#"{"cache_capacity": 50, "normalization": "fold_width"}"#)
                .unwrap();
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.normalization, NormalizationMode::FoldWidth);
        assert_eq!(config.max_index_tokens, DEFAULT_MAX_INDEX_TOKENS);
    }
}
