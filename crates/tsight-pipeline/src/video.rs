//! Video analysis pipeline.
//!
//! Sampling and analysis are pipelined: the sampler feeds a bounded channel
//! that the fan-out consumes, so at most `2 * max_frame_parallel` decoded
//! frames are alive at once. Producer and consumer run in one future;
//! dropping it (timeout, cancellation, client disconnect) stops decoding.

use futures::stream;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tsight_media::{validate_interval, Frame, FrameSampler, VideoDecoder};
use tsight_models::{round_to, ImageAnalysis, VideoResult};

use crate::analyzer::{encode_jpeg, ImagePayload};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::fanout::{partition_outcomes, FrameFanOut};
use crate::image_analysis::ImageAnalysisService;
use crate::logging::RequestLogger;
use crate::metrics;
use crate::reducer::reduce;

/// Orchestrates sampling, per-frame analysis and reduction for one video.
#[derive(Clone)]
pub struct VideoPipeline {
    decoder: Arc<dyn VideoDecoder>,
    images: ImageAnalysisService,
    fanout: FrameFanOut,
    config: PipelineConfig,
}

impl VideoPipeline {
    pub fn new(
        decoder: Arc<dyn VideoDecoder>,
        images: ImageAnalysisService,
        config: PipelineConfig,
    ) -> Self {
        Self {
            decoder,
            images,
            fanout: FrameFanOut::new(config.max_frame_parallel),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze the video at `path`, sampling every `interval_seconds`.
    pub async fn analyze_video(
        &self,
        path: &Path,
        interval_seconds: f64,
        cancel: watch::Receiver<bool>,
    ) -> PipelineResult<VideoResult> {
        let logger = RequestLogger::generate("video_analysis");
        self.analyze_video_logged(path, interval_seconds, cancel, &logger)
            .await
    }

    /// Same as [`VideoPipeline::analyze_video`], logging under an existing
    /// request id.
    pub async fn analyze_video_logged(
        &self,
        path: &Path,
        interval_seconds: f64,
        cancel: watch::Receiver<bool>,
        logger: &RequestLogger,
    ) -> PipelineResult<VideoResult> {
        let start = Instant::now();
        let timeout = self.config.video_timeout;
        logger.log_start(&format!(
            "{} (interval {}s, parallel {})",
            path.display(),
            interval_seconds,
            self.fanout.concurrency()
        ));

        let result = match tokio::time::timeout(
            timeout,
            self.run(path, interval_seconds, cancel, logger),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(timeout)),
        };

        let elapsed = start.elapsed().as_secs_f64();
        match result {
            Ok(mut video) => {
                video.processing_time = round_to(elapsed, 2);
                metrics::record_video_analysis("success", elapsed);
                logger.log_completion(&format!(
                    "truth score {} over {} frames ({} failed) in {:.2}s",
                    video.truth_score,
                    video.frames_analyzed,
                    video.failed_frames.len(),
                    elapsed
                ));
                Ok(video)
            }
            Err(e) => {
                let outcome = match &e {
                    PipelineError::Timeout(_) => "timeout",
                    PipelineError::Cancelled => "cancelled",
                    _ => "error",
                };
                metrics::record_video_analysis(outcome, elapsed);
                logger.log_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        path: &Path,
        interval_seconds: f64,
        cancel: watch::Receiver<bool>,
        logger: &RequestLogger,
    ) -> PipelineResult<VideoResult> {
        validate_interval(interval_seconds)?;

        let mut sampler =
            FrameSampler::open(self.decoder.as_ref(), path, interval_seconds).await?;
        logger.log_progress(&format!(
            "sampling every {} frames at {:.3} fps",
            sampler.step(),
            sampler.fps()
        ));

        let (tx, rx) = mpsc::channel::<Frame>(self.fanout.concurrency());

        let producer = async move {
            let mut sampled = 0usize;
            while let Some(frame) = sampler.next().await? {
                if tx.send(frame).await.is_err() {
                    // Consumer is gone; nothing left to feed.
                    sampler.close().await;
                    break;
                }
                sampled += 1;
            }
            drop(tx);
            Ok::<usize, PipelineError>(sampled)
        };

        let frames = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        });

        let images = self.images.clone();
        let quality = self.config.jpeg_quality;
        let analyze_one = move |frame: Frame| analyze_frame(images.clone(), frame, quality);

        let (sampled, outcomes) = tokio::try_join!(
            producer,
            self.fanout.analyze_all(frames, analyze_one, cancel)
        )?;

        if sampled == 0 {
            return Err(PipelineError::NoFramesExtracted);
        }

        let (analyzed, failed) = partition_outcomes(outcomes);
        if analyzed.is_empty() {
            return Err(PipelineError::AllFramesFailed {
                failed: failed.len(),
            });
        }
        if !failed.is_empty() {
            logger.log_warning(&format!(
                "{} of {} frames failed analysis",
                failed.len(),
                sampled
            ));
        }

        let mut video = reduce(&analyzed)?;
        video.failed_frames = failed;
        Ok(video)
    }
}

/// Encode one frame off the async runtime and analyze it.
async fn analyze_frame(
    images: ImageAnalysisService,
    frame: Frame,
    quality: u8,
) -> PipelineResult<ImageAnalysis> {
    let frame_index = frame.frame_index;
    let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&frame.image, quality))
        .await
        .map_err(|e| PipelineError::internal(format!("frame encoding task failed: {e}")))??;

    let payload =
        ImagePayload::new(bytes, "image/jpeg").with_filename(format!("frame_{frame_index}.jpg"));
    images.analyze(&payload).await
}
