//! Error type for the configuration surface.
//!
//! Matching itself is total: blank descriptors, empty catalogs and
//! sub-threshold candidates all come back as `None`. Errors only arise
//! when an embedder hands over an unusable configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    #[error("threshold must be a finite number in [0.0, 1.0], got {0}")]
    InvalidThreshold(f64),

    #[error("cache capacity must be greater than zero")]
    ZeroCacheCapacity,

    #[error("index token limit must be greater than zero")]
    ZeroTokenLimit,
}

pub type Result<T> = std::result::Result<T, MatcherError>;

/// Validate that a threshold is in the valid range [0.0, 1.0]
pub fn validate_threshold(value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MatcherError::InvalidThreshold(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(0.6).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert_eq!(validate_threshold(1.5), Err(MatcherError::InvalidThreshold(1.5)));
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MatcherError::ZeroCacheCapacity.to_string(),
            "cache capacity must be greater than zero"
        );
        assert!(MatcherError::InvalidThreshold(-1.0).to_string().contains("-1"));
    }
}
