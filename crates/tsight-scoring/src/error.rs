//! Error types for scoring configuration.

use thiserror::Error;
use tsight_models::Component;

/// Result type for scoring configuration.
pub type ScoringResult<T> = Result<T, ScoringError>;

/// Errors raised while building a weight policy.
///
/// Aggregation itself never fails; only invalid configuration does.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Invalid weight {weight} for component {component}: must be within [0, 1]")]
    InvalidWeight { component: Component, weight: f64 },

    #[error("Weights sum to {total}, expected 1.0")]
    WeightSumMismatch { total: f64 },
}
