//! Video analysis results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::{DeepfakeDetection, GanFingerprint, ImageAnalysis};

/// Analysis of one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysisResult {
    /// Decoded frame counter at which this frame was sampled
    pub frame_index: u64,
    /// Seconds from the start of the stream
    pub timestamp: f64,
    pub analysis: ImageAnalysis,
}

impl FrameAnalysisResult {
    pub fn truth_score(&self) -> f64 {
        self.analysis.truth_score
    }
}

/// A frame whose analysis failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrameFailure {
    pub frame_index: u64,
    pub timestamp: f64,
    pub reason: String,
}

/// One point of the per-frame truth score timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub frame_number: u64,
    pub timestamp: f64,
    pub truth_score: f64,
}

/// Metadata merged across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub compression_score: f64,
    pub gan_fingerprint: GanFingerprint,
}

/// Video-level verdict reduced from frame analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    pub truth_score: f64,
    pub ai_generated_probability: f64,
    pub real_probability: f64,
    /// Timeline, ascending by timestamp
    pub frame_analyses: Vec<TimelineEntry>,
    pub deepfake_detection: DeepfakeDetection,
    pub metadata: VideoMetadata,
    pub frames_analyzed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_frames: Vec<FrameFailure>,
    /// Seconds spent on the whole request, filled in by the pipeline
    pub processing_time: f64,
}
