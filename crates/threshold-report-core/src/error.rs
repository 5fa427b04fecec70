//! Error type shared by the store, deriver and composer.

use thiserror::Error;

/// Every failure the pipeline can raise. All of them are terminal for a report run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// A scenario sequence is malformed or a requested sequence is missing.
    #[error("validation failed for scenario '{scenario}' metric '{metric}': {reason}")]
    Validation {
        scenario: String,
        metric: String,
        reason: String,
    },
    /// The threshold configuration itself is malformed.
    #[error("invalid threshold configuration: {reason}")]
    InvalidThresholds { reason: String },
    #[error("unknown scenario '{scenario}'")]
    NotFound { scenario: String },
    /// Speedup denominator (final execution time) is zero, or the ratio overflows.
    #[error("speedup for scenario '{scenario}' is undefined: final execution time is zero or too small for a finite ratio")]
    DivisionByZero { scenario: String },
}

impl ReportError {
    /// Build a [`ReportError::Validation`].
    pub fn validation(
        scenario: impl Into<String>,
        metric: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            scenario: scenario.into(),
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    /// True for both the per-scenario and the threshold-level validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidThresholds { .. })
    }

    /// Scenario the error refers to, when there is one.
    #[must_use]
    pub fn scenario(&self) -> Option<&str> {
        match self {
            Self::Validation { scenario, .. }
            | Self::NotFound { scenario }
            | Self::DivisionByZero { scenario } => Some(scenario),
            Self::InvalidThresholds { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_scenario_and_metric() {
        let err = ReportError::validation("small_alloc", "free_space_bytes", "expected 4 values, got 3");
        assert_eq!(
            err.to_string(),
            "validation failed for scenario 'small_alloc' metric 'free_space_bytes': expected 4 values, got 3"
        );
        assert!(err.is_validation());
        assert_eq!(err.scenario(), Some("small_alloc"));
    }

    #[test]
    fn threshold_errors_count_as_validation() {
        let err = ReportError::InvalidThresholds {
            reason: "empty".to_string(),
        };
        assert!(err.is_validation());
        assert_eq!(err.scenario(), None);
    }

    #[test]
    fn division_by_zero_is_not_validation() {
        let err = ReportError::DivisionByZero {
            scenario: "stalled".to_string(),
        };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("undefined"));
    }
}
