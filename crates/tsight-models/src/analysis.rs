//! Per-image analysis results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::component::Component;
use crate::signal::DeepfakeFace;

/// Renormalized weights used for one aggregation.
pub type ActiveWeightSet = BTreeMap<Component, f64>;

/// Output of the truth score aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// 0-100, 100 = confidently authentic
    pub truth_score: f64,
    /// Always `100 - truth_score`
    pub ai_generated_probability: f64,
    /// Unweighted fake probability per component, scaled to 0-100
    pub component_scores: BTreeMap<Component, f64>,
    /// Weights actually applied (inapplicable components excluded)
    pub active_weights: ActiveWeightSet,
}

/// Face-forgery summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeepfakeDetection {
    pub faces_detected: u32,
    pub deepfake_faces: Vec<DeepfakeFace>,
}

/// GAN fingerprint summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GanFingerprint {
    pub detected: bool,
    pub confidence: f64,
}

/// Metadata section of an image analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub exif: Map<String, Value>,
    pub compression_score: f64,
    pub gan_fingerprint: GanFingerprint,
    pub anomalies: Vec<String>,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            exif: Map::new(),
            compression_score: 100.0,
            gan_fingerprint: GanFingerprint::default(),
            anomalies: Vec::new(),
        }
    }
}

/// A component whose detector result could not be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DegradedComponent {
    pub component: Component,
    pub reason: String,
}

/// Full response for a single analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub truth_score: f64,
    pub ai_generated_probability: f64,
    pub real_probability: f64,
    pub deepfake_detection: DeepfakeDetection,
    pub manipulation_heatmap: String,
    pub metadata: ImageMetadata,
    pub predicted_source: String,
    /// Seconds spent analyzing this image
    pub processing_time: f64,
    pub component_scores: BTreeMap<Component, f64>,
    pub active_weights: ActiveWeightSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_components: Vec<DegradedComponent>,
}
