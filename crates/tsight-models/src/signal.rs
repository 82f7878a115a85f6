//! Raw detector signals and the per-image signal bundle.
//!
//! Each detector reports its own result shape. A result that cannot be
//! decoded is kept as [`ComponentSignal::Degraded`] instead of failing the
//! whole bundle, so a single broken detector never aborts an analysis.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::component::Component;

/// Zero-shot real/AI classifier output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipSignal {
    /// Probability (0-100) that the image is AI generated
    #[serde(default)]
    pub ai_generated_probability: f64,
    /// Probability (0-100) that the image is a real photograph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_probability: Option<f64>,
}

/// A face flagged by the deepfake detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeepfakeFace {
    /// Confidence (0-1) that the face is synthetic
    #[serde(default)]
    pub confidence: f64,
    /// Detector-specific details (bbox, landmarks, ...), passed through as-is
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl DeepfakeFace {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            details: Map::new(),
        }
    }
}

/// Face-forgery detector output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeepfakeSignal {
    #[serde(default)]
    pub faces_detected: u32,
    #[serde(default)]
    pub deepfake_faces: Vec<DeepfakeFace>,
}

/// GAN fingerprint (frequency artifact) detector output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GanSignal {
    #[serde(default)]
    pub detected: bool,
    #[serde(default)]
    pub confidence: f64,
}

/// Manipulation detector output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForgerySignal {
    #[serde(default)]
    pub is_manipulated: bool,
    #[serde(default)]
    pub confidence: f64,
    /// Base64-encoded manipulation heatmap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<String>,
}

/// Metadata / EXIF analyzer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetadataSignal {
    /// Compression consistency score (0-100, 100 = untouched)
    #[serde(default = "default_compression_score")]
    pub compression_score: f64,
    #[serde(default)]
    pub anomalies: Vec<String>,
    #[serde(default)]
    pub exif: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_detected: Option<String>,
    #[serde(default)]
    pub is_metadata_stripped: bool,
}

fn default_compression_score() -> f64 {
    100.0
}

impl Default for MetadataSignal {
    fn default() -> Self {
        Self {
            compression_score: default_compression_score(),
            anomalies: Vec::new(),
            exif: Map::new(),
            software_detected: None,
            is_metadata_stripped: false,
        }
    }
}

/// Source-model prediction. Reported alongside the score, never weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourcePrediction {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub confidence: f64,
}

fn default_source() -> String {
    "Unknown".to_string()
}

/// A component result that is either usable or degraded with a reason.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentSignal<T> {
    Ok(T),
    Degraded { reason: String },
}

impl<T> ComponentSignal<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reason: reason.into(),
        }
    }

    /// The decoded signal, if usable.
    pub fn ok(&self) -> Option<&T> {
        match self {
            ComponentSignal::Ok(signal) => Some(signal),
            ComponentSignal::Degraded { .. } => None,
        }
    }

    /// Degradation reason, if any.
    pub fn degradation(&self) -> Option<&str> {
        match self {
            ComponentSignal::Ok(_) => None,
            ComponentSignal::Degraded { reason } => Some(reason),
        }
    }
}

impl<T: DeserializeOwned> ComponentSignal<T> {
    /// Decode a raw detector value, degrading on any shape mismatch.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(signal) => ComponentSignal::Ok(signal),
            Err(e) => ComponentSignal::degraded(format!("malformed result: {e}")),
        }
    }
}

/// All raw signals collected for one image.
///
/// `None` means the component produced no signal for this input.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct SignalBundle {
    pub clip: Option<ComponentSignal<ClipSignal>>,
    pub deepfake: Option<ComponentSignal<DeepfakeSignal>>,
    pub gan: Option<ComponentSignal<GanSignal>>,
    pub forgery: Option<ComponentSignal<ForgerySignal>>,
    pub metadata: Option<ComponentSignal<MetadataSignal>>,
    pub source: Option<SourcePrediction>,
}

impl SignalBundle {
    /// Empty bundle (no component reported anything).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, signal: ClipSignal) -> Self {
        self.clip = Some(ComponentSignal::Ok(signal));
        self
    }

    pub fn with_deepfake(mut self, signal: DeepfakeSignal) -> Self {
        self.deepfake = Some(ComponentSignal::Ok(signal));
        self
    }

    pub fn with_gan(mut self, signal: GanSignal) -> Self {
        self.gan = Some(ComponentSignal::Ok(signal));
        self
    }

    pub fn with_forgery(mut self, signal: ForgerySignal) -> Self {
        self.forgery = Some(ComponentSignal::Ok(signal));
        self
    }

    pub fn with_metadata(mut self, signal: MetadataSignal) -> Self {
        self.metadata = Some(ComponentSignal::Ok(signal));
        self
    }

    pub fn with_source(mut self, prediction: SourcePrediction) -> Self {
        self.source = Some(prediction);
        self
    }

    /// Mark a component as degraded.
    pub fn with_degraded(mut self, component: Component, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match component {
            Component::Clip => self.clip = Some(ComponentSignal::degraded(reason)),
            Component::Deepfake => self.deepfake = Some(ComponentSignal::degraded(reason)),
            Component::Gan => self.gan = Some(ComponentSignal::degraded(reason)),
            Component::Forgery => self.forgery = Some(ComponentSignal::degraded(reason)),
            Component::Metadata => self.metadata = Some(ComponentSignal::degraded(reason)),
        }
        self
    }

    /// Insert a raw detector value for a component, decoding it in place.
    pub fn insert_raw(&mut self, component: Component, value: Value) {
        match component {
            Component::Clip => self.clip = Some(ComponentSignal::from_value(value)),
            Component::Deepfake => self.deepfake = Some(ComponentSignal::from_value(value)),
            Component::Gan => self.gan = Some(ComponentSignal::from_value(value)),
            Component::Forgery => self.forgery = Some(ComponentSignal::from_value(value)),
            Component::Metadata => self.metadata = Some(ComponentSignal::from_value(value)),
        }
    }

    /// Components that were present but degraded, with their reasons.
    pub fn degraded_components(&self) -> Vec<(Component, String)> {
        let reasons = [
            (Component::Clip, self.clip.as_ref().and_then(|s| s.degradation())),
            (
                Component::Deepfake,
                self.deepfake.as_ref().and_then(|s| s.degradation()),
            ),
            (Component::Gan, self.gan.as_ref().and_then(|s| s.degradation())),
            (
                Component::Forgery,
                self.forgery.as_ref().and_then(|s| s.degradation()),
            ),
            (
                Component::Metadata,
                self.metadata.as_ref().and_then(|s| s.degradation()),
            ),
        ];

        reasons
            .into_iter()
            .filter_map(|(component, reason)| reason.map(|r| (component, r.to_string())))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for SignalBundle {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut bundle = SignalBundle::new();
        for (key, value) in raw {
            if key == "source" {
                bundle.source = serde_json::from_value(value).ok();
                continue;
            }
            // Unknown keys are ignored; the bundle shape is closed.
            if let Ok(component) = key.parse::<Component>() {
                bundle.insert_raw(component, value);
            }
        }
        bundle
    }
}
