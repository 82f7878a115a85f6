//! Component weight policy.
//!
//! Holds the base weights and derives the active, renormalized weight set
//! for one aggregation. Only inapplicable components are excluded; absent
//! or degraded components keep their weight and contribute 0.0.

use tracing::debug;
use tsight_models::{ActiveWeightSet, Component};

use crate::error::{ScoringError, ScoringResult};
use crate::normalizer::NormalizedBundle;

/// Allowed distance of a custom weight total from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Base weights and renormalization rules.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightPolicy {
    base: ActiveWeightSet,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            base: Component::ALL
                .iter()
                .map(|c| (*c, c.base_weight()))
                .collect(),
        }
    }
}

impl WeightPolicy {
    /// Create a policy with custom base weights.
    ///
    /// Components missing from `weights` get weight 0.0. The weights must
    /// sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
    pub fn new(weights: impl IntoIterator<Item = (Component, f64)>) -> ScoringResult<Self> {
        let mut base: ActiveWeightSet = Component::ALL.iter().map(|c| (*c, 0.0)).collect();
        for (component, weight) in weights {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ScoringError::InvalidWeight { component, weight });
            }
            base.insert(component, weight);
        }

        let total: f64 = base.values().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::WeightSumMismatch { total });
        }
        Ok(Self { base })
    }

    /// Base weight of a component.
    pub fn base_weight(&self, component: Component) -> f64 {
        self.base.get(&component).copied().unwrap_or(0.0)
    }

    /// All base weights.
    pub fn base_weights(&self) -> &ActiveWeightSet {
        &self.base
    }

    /// Compute the active weight set for a normalized bundle.
    ///
    /// With nothing excluded the base weights are returned unchanged.
    /// Otherwise the remaining weights are rescaled to sum to 1. A zero-sum
    /// remainder yields an empty set.
    pub fn active_weights(&self, normalized: &NormalizedBundle) -> ActiveWeightSet {
        let excluded: Vec<Component> = normalized.inapplicable().collect();
        if excluded.is_empty() {
            return self.base.clone();
        }

        let remaining: ActiveWeightSet = self
            .base
            .iter()
            .filter(|(component, _)| !excluded.contains(*component))
            .map(|(component, weight)| (*component, *weight))
            .collect();

        let total: f64 = remaining.values().sum();
        if total <= 0.0 {
            debug!(?excluded, "No active weight left after exclusions");
            return ActiveWeightSet::new();
        }

        remaining
            .into_iter()
            .map(|(component, weight)| (component, weight / total))
            .collect()
    }
}
