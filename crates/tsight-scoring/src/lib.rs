//! Truth score computation for the TrueSight engine.
//!
//! This crate turns a [`SignalBundle`](tsight_models::SignalBundle) into an
//! [`AggregationResult`](tsight_models::AggregationResult):
//! - [`normalizer`]: per-component fake probabilities in [0, 1]
//! - [`weights`]: base weights and active-set renormalization
//! - [`aggregator`]: weighted combination into a 0-100 truth score
//!
//! Everything here is synchronous and free of I/O.

pub mod aggregator;
pub mod error;
pub mod normalizer;
pub mod weights;

pub use aggregator::TruthScoreAggregator;
pub use error::{ScoringError, ScoringResult};
pub use normalizer::{
    normalize, NormalizedBundle, NormalizedSignal, METADATA_ANOMALY_PENALTY,
};
pub use weights::{WeightPolicy, WEIGHT_SUM_TOLERANCE};
