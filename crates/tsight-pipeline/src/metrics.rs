//! Analysis metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Frames whose analysis completed.
    pub const FRAMES_ANALYZED_TOTAL: &str = "tsight_frames_analyzed_total";

    /// Frames whose analysis failed and were isolated.
    pub const FRAME_FAILURES_TOTAL: &str = "tsight_frame_failures_total";

    /// End-to-end video analysis latency by outcome.
    pub const VIDEO_ANALYSIS_DURATION_SECONDS: &str = "tsight_video_analysis_duration_seconds";

    /// Single image analysis latency by outcome.
    pub const IMAGE_ANALYSIS_DURATION_SECONDS: &str = "tsight_image_analysis_duration_seconds";
}

pub fn record_frame_analyzed() {
    counter!(names::FRAMES_ANALYZED_TOTAL).increment(1);
}

pub fn record_frame_failure() {
    counter!(names::FRAME_FAILURES_TOTAL).increment(1);
}

/// Record a finished video analysis.
pub fn record_video_analysis(outcome: &str, duration_secs: f64) {
    histogram!(
        names::VIDEO_ANALYSIS_DURATION_SECONDS,
        "outcome" => outcome.to_string()
    )
    .record(duration_secs);
}

/// Record a finished image analysis.
pub fn record_image_analysis(outcome: &str, duration_secs: f64) {
    histogram!(
        names::IMAGE_ANALYSIS_DURATION_SECONDS,
        "outcome" => outcome.to_string()
    )
    .record(duration_secs);
}
