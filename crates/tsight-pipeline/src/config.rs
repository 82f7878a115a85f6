//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Video and image pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Default seconds between sampled frames
    pub frame_interval_seconds: f64,
    /// Maximum frames analyzed concurrently per video
    pub max_frame_parallel: usize,
    /// Overall deadline for one video analysis
    pub video_timeout: Duration,
    /// Longest accepted video, in seconds
    pub max_video_duration_secs: f64,
    /// Directory for uploaded video temp files
    pub work_dir: PathBuf,
    /// JPEG quality used when handing frames to the analyzer
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_interval_seconds: 1.0,
            max_frame_parallel: 4,
            video_timeout: Duration::from_secs(600), // 10 minutes
            max_video_duration_secs: 300.0,
            work_dir: std::env::temp_dir(),
            jpeg_quality: 90,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            frame_interval_seconds: std::env::var("FRAME_EXTRACTION_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.frame_interval_seconds),
            max_frame_parallel: std::env::var("MAX_FRAME_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or(defaults.max_frame_parallel),
            video_timeout: Duration::from_secs(
                std::env::var("VIDEO_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            max_video_duration_secs: std::env::var("MAX_VIDEO_DURATION_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_video_duration_secs),
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            jpeg_quality: std::env::var("FRAME_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|q: u8| q.clamp(1, 100))
                .unwrap_or(defaults.jpeg_quality),
        }
    }
}
