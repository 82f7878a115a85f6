//! Shared data models for the TrueSight engine.
//!
//! This crate provides Serde-serializable types for:
//! - Signal components and their base weights
//! - Raw detector signals and the per-image signal bundle
//! - Aggregation results and image analysis responses
//! - Frame-level and video-level analysis results

pub mod analysis;
pub mod component;
pub mod signal;
pub mod utils;
pub mod video;

// Re-export common types
pub use analysis::{
    ActiveWeightSet, AggregationResult, DeepfakeDetection, DegradedComponent, GanFingerprint,
    ImageAnalysis, ImageMetadata,
};
pub use component::{Component, ComponentParseError};
pub use signal::{
    ClipSignal, ComponentSignal, DeepfakeFace, DeepfakeSignal, ForgerySignal, GanSignal,
    MetadataSignal, SignalBundle, SourcePrediction,
};
pub use utils::round_to;
pub use video::{FrameAnalysisResult, FrameFailure, TimelineEntry, VideoMetadata, VideoResult};
