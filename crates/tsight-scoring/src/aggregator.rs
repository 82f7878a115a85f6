//! Truth score aggregation.
//!
//! Combines normalized fake probabilities with the active weight set:
//!
//! ```text
//! final_fake = Σ fake_i * w_i'        (active components only)
//! truth      = clamp(100 - final_fake * 100, 0, 100)
//! ai_prob    = 100 - truth
//! ```
//!
//! Component scores report the unweighted fake probability so callers can
//! see which signal drove the result independently of its weight.

use std::collections::BTreeMap;
use tracing::debug;
use tsight_models::{round_to, AggregationResult, Component, SignalBundle};

use crate::normalizer::normalize;
use crate::weights::WeightPolicy;

/// Decimal places kept in truth and component scores.
const SCORE_DECIMALS: u32 = 1;

/// Stateless truth score aggregator.
#[derive(Debug, Clone, Default)]
pub struct TruthScoreAggregator {
    policy: WeightPolicy,
}

impl TruthScoreAggregator {
    /// Create an aggregator with a custom weight policy.
    pub fn new(policy: WeightPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &WeightPolicy {
        &self.policy
    }

    /// Aggregate one signal bundle. Never fails.
    ///
    /// An empty or fully absent bundle scores 100: absence of evidence is
    /// treated as authenticity.
    pub fn aggregate(&self, bundle: &SignalBundle) -> AggregationResult {
        let normalized = normalize(bundle);
        let active_weights = self.policy.active_weights(&normalized);

        let final_fake: f64 = active_weights
            .iter()
            .map(|(component, weight)| normalized.fake_probability(*component) * weight)
            .sum();

        let truth_score = round_to(
            (100.0 - final_fake * 100.0).clamp(0.0, 100.0),
            SCORE_DECIMALS,
        );

        let component_scores: BTreeMap<Component, f64> = Component::ALL
            .iter()
            .map(|c| {
                (
                    *c,
                    round_to(normalized.fake_probability(*c) * 100.0, SCORE_DECIMALS),
                )
            })
            .collect();

        debug!(
            final_fake,
            truth_score,
            excluded = ?normalized.inapplicable().collect::<Vec<_>>(),
            "Aggregated truth score"
        );

        AggregationResult {
            truth_score,
            ai_generated_probability: 100.0 - truth_score,
            component_scores,
            active_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsight_models::{
        ClipSignal, DeepfakeFace, DeepfakeSignal, ForgerySignal, GanSignal, MetadataSignal,
    };

    fn real_bundle() -> SignalBundle {
        SignalBundle::new()
            .with_clip(ClipSignal {
                ai_generated_probability: 10.0,
                real_probability: Some(90.0),
            })
            .with_deepfake(DeepfakeSignal::default())
            .with_gan(GanSignal {
                detected: false,
                confidence: 0.1,
            })
            .with_forgery(ForgerySignal {
                is_manipulated: false,
                confidence: 0.05,
                heatmap: None,
            })
            .with_metadata(MetadataSignal {
                compression_score: 95.0,
                ..Default::default()
            })
    }

    fn fake_bundle() -> SignalBundle {
        SignalBundle::new()
            .with_clip(ClipSignal {
                ai_generated_probability: 95.0,
                real_probability: Some(5.0),
            })
            .with_deepfake(DeepfakeSignal {
                faces_detected: 1,
                deepfake_faces: vec![DeepfakeFace::new(0.9)],
            })
            .with_gan(GanSignal {
                detected: true,
                confidence: 0.85,
            })
            .with_forgery(ForgerySignal {
                is_manipulated: true,
                confidence: 0.8,
                heatmap: Some("aGVhdG1hcA==".to_string()),
            })
            .with_metadata(MetadataSignal {
                compression_score: 20.0,
                anomalies: vec!["Suspicious editing software detected: GIMP".to_string()],
                ..Default::default()
            })
    }

    fn assert_bounded(result: &AggregationResult) {
        assert!((0.0..=100.0).contains(&result.truth_score));
        assert_eq!(result.truth_score + result.ai_generated_probability, 100.0);
    }

    #[test]
    fn test_real_inputs_score_high() {
        let result = TruthScoreAggregator::default().aggregate(&real_bundle());
        assert!(result.truth_score > 80.0, "got {}", result.truth_score);
        assert!(!result.active_weights.contains_key(&Component::Deepfake));
        assert_bounded(&result);
    }

    #[test]
    fn test_fake_inputs_score_low() {
        let result = TruthScoreAggregator::default().aggregate(&fake_bundle());
        assert!(result.truth_score < 30.0, "got {}", result.truth_score);
        assert_eq!(result.active_weights.len(), 5);
        assert_bounded(&result);
    }

    #[test]
    fn test_empty_bundle_scores_100() {
        let result = TruthScoreAggregator::default().aggregate(&SignalBundle::new());
        assert_eq!(result.truth_score, 100.0);
        assert_eq!(result.ai_generated_probability, 0.0);
    }

    #[test]
    fn test_degenerate_weights_score_100() {
        let policy = WeightPolicy::new([(Component::Deepfake, 1.0)]).unwrap();
        let result = TruthScoreAggregator::new(policy).aggregate(&fake_bundle().with_deepfake(
            DeepfakeSignal::default(),
        ));
        assert!(result.active_weights.is_empty());
        assert_eq!(result.truth_score, 100.0);
    }

    #[test]
    fn test_component_scores_are_unweighted() {
        let result = TruthScoreAggregator::default().aggregate(&fake_bundle());
        assert_eq!(result.component_scores[&Component::Clip], 95.0);
        assert_eq!(result.component_scores[&Component::Deepfake], 90.0);
        assert_eq!(result.component_scores[&Component::Gan], 85.0);
        assert_eq!(result.component_scores[&Component::Forgery], 80.0);
        assert_eq!(result.component_scores[&Component::Metadata], 100.0);
    }

    #[test]
    fn test_anomalies_strictly_decrease_truth() {
        let aggregator = TruthScoreAggregator::default();
        let clean = real_bundle();
        let flagged = real_bundle().with_metadata(MetadataSignal {
            compression_score: 95.0,
            anomalies: vec!["No EXIF metadata found (possibly stripped)".to_string()],
            ..Default::default()
        });

        let clean_score = aggregator.aggregate(&clean).truth_score;
        let flagged_score = aggregator.aggregate(&flagged).truth_score;
        assert!(flagged_score < clean_score);
    }

    #[test]
    fn test_deterministic() {
        let aggregator = TruthScoreAggregator::default();
        let a = aggregator.aggregate(&fake_bundle());
        let b = aggregator.aggregate(&fake_bundle());
        assert_eq!(a, b);
        assert_eq!(a.truth_score.to_bits(), b.truth_score.to_bits());
    }

    #[test]
    fn test_bounds_hold_across_inputs() {
        let aggregator = TruthScoreAggregator::default();
        for clip in [0.0, 12.3, 50.0, 77.7, 100.0, 180.0] {
            for compression in [-20.0, 0.0, 33.3, 95.0, 100.0, 140.0] {
                for faces in [0, 1, 4] {
                    let bundle = SignalBundle::new()
                        .with_clip(ClipSignal {
                            ai_generated_probability: clip,
                            real_probability: None,
                        })
                        .with_deepfake(DeepfakeSignal {
                            faces_detected: faces,
                            deepfake_faces: (0..faces).map(|i| DeepfakeFace::new(i as f64 * 0.3)).collect(),
                        })
                        .with_metadata(MetadataSignal {
                            compression_score: compression,
                            anomalies: vec!["x".to_string()],
                            ..Default::default()
                        });
                    let result = aggregator.aggregate(&bundle);
                    assert_bounded(&result);
                    let total: f64 = result.active_weights.values().sum();
                    assert!((total - 1.0).abs() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_serialized_weights_omit_deepfake_without_faces() {
        let result = TruthScoreAggregator::default().aggregate(&real_bundle());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["activeWeights"].get("deepfake_detector").is_none());
        assert!(json["componentScores"].get("deepfake_detector").is_some());
    }
}
