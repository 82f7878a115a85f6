//! Per-image signal analyzer seam.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tsight_models::SignalBundle;

use crate::error::{PipelineError, PipelineResult};

/// An encoded image submitted for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Passed to metadata analysis; frames use a synthetic name
    pub filename: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Produces the raw signal bundle for one image.
///
/// Implementations must be safe to call concurrently. Per-component
/// failures belong in the bundle as degraded components; an `Err` means
/// the whole image could not be analyzed.
#[async_trait]
pub trait SignalAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> PipelineResult<SignalBundle>;

    /// Whether the analyzer backend is reachable.
    async fn ready(&self) -> bool {
        true
    }
}

/// Encode an RGB frame as JPEG. CPU-bound; call from a blocking thread.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .map_err(|e| PipelineError::Encode(e.to_string()))?;
    Ok(buf)
}
