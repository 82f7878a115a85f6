//! Signal component definitions.
//!
//! A component is one independent authenticity signal that feeds the
//! truth score:
//!
//! - `Clip`: zero-shot real/AI image classifier
//! - `Deepfake`: face-forgery detector
//! - `Gan`: frequency-domain GAN fingerprint detector
//! - `Forgery`: manipulation (splice/inpaint) detector
//! - `Metadata`: EXIF and compression analysis

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One authenticity signal component.
///
/// Serialized with the detector reporting key (`clip_classifier`, ...), which
/// is the key used in `componentScores` and `activeWeights`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Component {
    #[serde(rename = "clip_classifier")]
    Clip,
    #[serde(rename = "deepfake_detector")]
    Deepfake,
    #[serde(rename = "gan_detector")]
    Gan,
    #[serde(rename = "forgery_detector")]
    Forgery,
    #[serde(rename = "metadata_analysis")]
    Metadata,
}

impl Component {
    /// All components in declaration order.
    pub const ALL: &'static [Component] = &[
        Component::Clip,
        Component::Deepfake,
        Component::Gan,
        Component::Forgery,
        Component::Metadata,
    ];

    /// Bundle key for this component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Clip => "clip",
            Component::Deepfake => "deepfake",
            Component::Gan => "gan",
            Component::Forgery => "forgery",
            Component::Metadata => "metadata",
        }
    }

    /// Reporting key used in score breakdowns.
    pub fn detector_key(&self) -> &'static str {
        match self {
            Component::Clip => "clip_classifier",
            Component::Deepfake => "deepfake_detector",
            Component::Gan => "gan_detector",
            Component::Forgery => "forgery_detector",
            Component::Metadata => "metadata_analysis",
        }
    }

    /// Base weight of this component in the truth score.
    pub fn base_weight(&self) -> f64 {
        match self {
            Component::Clip => 0.30,
            Component::Deepfake => 0.25,
            Component::Gan => 0.20,
            Component::Forgery => 0.15,
            Component::Metadata => 0.10,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Component {
    type Err = ComponentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clip" | "clip_classifier" => Ok(Component::Clip),
            "deepfake" | "deepfake_detector" => Ok(Component::Deepfake),
            "gan" | "gan_detector" => Ok(Component::Gan),
            "forgery" | "forgery_detector" => Ok(Component::Forgery),
            "metadata" | "metadata_analysis" => Ok(Component::Metadata),
            _ => Err(ComponentParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown signal component: {0}")]
pub struct ComponentParseError(String);
