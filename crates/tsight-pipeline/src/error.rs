//! Pipeline error types.

use std::time::Duration;

use thiserror::Error;
use tsight_media::MediaError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while reducing frame results.
#[derive(Debug, Error, PartialEq)]
pub enum ReduceError {
    #[error("Cannot reduce an empty set of frame results")]
    Empty,

    #[error("Frame results out of timestamp order at position {index}")]
    OutOfOrder { index: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No frames could be extracted from the video")]
    NoFramesExtracted,

    #[error("All {failed} sampled frames failed analysis")]
    AllFramesFailed { failed: usize },

    #[error("Video analysis cancelled")]
    Cancelled,

    #[error("Video analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Signal analysis failed: {0}")]
    Analyzer(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Reduce error: {0}")]
    Reduce(#[from] ReduceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn analyzer(msg: impl Into<String>) -> Self {
        Self::Analyzer(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if the error was caused by the submitted media.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::NoFramesExtracted => true,
            PipelineError::Media(e) => e.is_client_error(),
            _ => false,
        }
    }

    /// Check if the error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(PipelineError::NoFramesExtracted.is_client_error());
        assert!(PipelineError::from(MediaError::InvalidInterval(0.0)).is_client_error());
        assert!(PipelineError::from(MediaError::stream_open("/tmp/x.mp4", "bad header")).is_client_error());
        assert!(!PipelineError::from(MediaError::FfmpegNotFound).is_client_error());
        assert!(!PipelineError::AllFramesFailed { failed: 3 }.is_client_error());
        assert!(PipelineError::Timeout(Duration::from_secs(600)).is_timeout());
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        assert_eq!(
            PipelineError::Timeout(Duration::from_millis(50)).to_string(),
            "Video analysis timed out after 50ms"
        );
        assert_eq!(
            PipelineError::Timeout(Duration::from_secs(600)).to_string(),
            "Video analysis timed out after 600s"
        );
    }

    #[test]
    fn test_no_frames_message() {
        assert_eq!(
            PipelineError::NoFramesExtracted.to_string(),
            "No frames could be extracted from the video"
        );
    }
}
