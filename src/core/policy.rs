//! Grounding policy applied on top of computed confidences.
//!
//! The scoring core never reads a threshold. This is where a confidence turns
//! into a grounded/fabricated verdict, and where the data context is checked
//! against its size limit before it is sent to a model.

use thiserror::Error;

use crate::domain::Verdict;

/// Threshold and limits for classifying matches
///
/// Built only through [`GroundingPolicy::new`] or `Default`, so the threshold
/// is always a probability.
#[derive(Debug, Clone)]
pub struct GroundingPolicy {
    threshold: f64,
    max_context_bytes: usize,
}

impl Default for GroundingPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            max_context_bytes: 1_048_576, // 1MB
        }
    }
}

impl GroundingPolicy {
    /// Create a policy, rejecting thresholds outside [0, 1]
    pub fn new(threshold: f64, max_context_bytes: usize) -> Result<Self, PolicyError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PolicyError::ThresholdOutOfRange { threshold });
        }
        Ok(Self {
            threshold,
            max_context_bytes,
        })
    }

    /// Minimum confidence for a match to count as grounded
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a confidence value
    pub fn classify(&self, confidence: f64) -> Verdict {
        if confidence >= self.threshold {
            Verdict::Grounded
        } else {
            Verdict::Fabricated
        }
    }

    /// Validate a data context against the size limit
    pub fn validate_context(&self, context: &str) -> Result<(), PolicyError> {
        let size = context.len();
        if size > self.max_context_bytes {
            return Err(PolicyError::ContextTooLarge {
                actual: size,
                limit: self.max_context_bytes,
            });
        }
        Ok(())
    }
}

/// Policy errors
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("Confidence threshold must be within [0, 1], got {threshold}")]
    ThresholdOutOfRange { threshold: f64 },

    #[error("Data context too large: {actual} > {limit} bytes")]
    ContextTooLarge { actual: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = GroundingPolicy::default();
        assert_eq!(policy.threshold(), 0.8);
        assert!(policy.validate_context(&"x".repeat(1_048_576)).is_ok());
        assert!(policy.validate_context(&"x".repeat(1_048_577)).is_err());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = GroundingPolicy::new(0.5, 100).unwrap();
        assert_eq!(policy.classify(0.5), Verdict::Grounded);
        assert_eq!(policy.classify(0.4999), Verdict::Fabricated);
        assert_eq!(policy.classify(1.0), Verdict::Grounded);
    }

    #[test]
    fn test_threshold_range() {
        assert!(GroundingPolicy::new(0.0, 1).is_ok());
        assert!(GroundingPolicy::new(1.0, 1).is_ok());
        assert!(matches!(
            GroundingPolicy::new(1.5, 1),
            Err(PolicyError::ThresholdOutOfRange { .. })
        ));
        assert!(GroundingPolicy::new(f64::NAN, 1).is_err());
    }

    #[test]
    fn test_out_of_range_threshold_cannot_be_built() {
        for threshold in [5.0, -0.1, f64::INFINITY] {
            match GroundingPolicy::new(threshold, 1) {
                Err(PolicyError::ThresholdOutOfRange { threshold: got }) => {
                    assert_eq!(got, threshold)
                }
                other => panic!("expected range error for {}, got {:?}", threshold, other),
            }
        }
    }

    #[test]
    fn test_context_limit() {
        let policy = GroundingPolicy::new(0.8, 10).unwrap();
        assert!(policy.validate_context("short").is_ok());
        assert!(policy.validate_context(&"x".repeat(10)).is_ok());

        let result = policy.validate_context(&"x".repeat(11));
        assert!(matches!(
            result,
            Err(PolicyError::ContextTooLarge { actual: 11, limit: 10 })
        ));
    }
}
