//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while opening, probing or decoding a video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Could not open video stream {path}: {reason}")]
    StreamOpen { path: PathBuf, reason: String },

    #[error("Invalid sampling interval {0}: must be a positive number of seconds")]
    InvalidInterval(f64),

    #[error("Video is {duration:.1}s long, maximum is {max:.1}s")]
    VideoTooLong { duration: f64, max: f64 },

    #[error("Frame decode failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),
}

impl MediaError {
    /// Create a stream open error.
    pub fn stream_open(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StreamOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a frame decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether this error was caused by the input rather than the host.
    ///
    /// Unopenable streams, oversized videos and bad intervals are client
    /// errors; missing binaries and I/O failures are not.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaError::StreamOpen { .. }
                | MediaError::InvalidInterval(_)
                | MediaError::VideoTooLong { .. }
                | MediaError::InvalidVideo(_)
        )
    }
}
