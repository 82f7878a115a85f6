//! Application state.

use std::sync::Arc;

use tsight_media::{FfmpegDecoder, VideoDecoder};
use tsight_ml_client::{DetectorClient, MlResult};
use tsight_pipeline::{ImageAnalysisService, PipelineConfig, SignalAnalyzer, VideoPipeline};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Arc<dyn SignalAnalyzer>,
    pub images: ImageAnalysisService,
    pub video: VideoPipeline,
}

impl AppState {
    /// Wire services around an analyzer and a video decoder.
    pub fn new(
        config: ApiConfig,
        pipeline_config: PipelineConfig,
        analyzer: Arc<dyn SignalAnalyzer>,
        decoder: Arc<dyn VideoDecoder>,
    ) -> Self {
        let images = ImageAnalysisService::new(Arc::clone(&analyzer));
        let video = VideoPipeline::new(decoder, images.clone(), pipeline_config);
        Self {
            config,
            analyzer,
            images,
            video,
        }
    }

    /// Production wiring: HTTP detector service and FFmpeg decoding.
    pub fn from_env(config: ApiConfig) -> MlResult<Self> {
        let pipeline_config = PipelineConfig::from_env();
        let analyzer: Arc<dyn SignalAnalyzer> = Arc::new(DetectorClient::from_env()?);
        let decoder: Arc<dyn VideoDecoder> = Arc::new(
            FfmpegDecoder::new().with_max_duration(pipeline_config.max_video_duration_secs),
        );
        Ok(Self::new(config, pipeline_config, analyzer, decoder))
    }
}
