//! Fixed-interval frame sampling.
//!
//! A frame is emitted whenever `decoded_counter % step == 0`, where
//! `step = max(1, round(fps * interval))`. Timestamps are derived from the
//! counter, not from container timestamps.

use image::RgbImage;
use std::path::Path;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::source::{VideoDecoder, VideoSource};

/// Frame rate assumed when the stream reports none.
pub const DEFAULT_FPS: f64 = 30.0;

/// A sampled video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Seconds from the start of the stream
    pub timestamp: f64,
    /// Decoded frame counter at which this frame was taken
    pub frame_index: u64,
}

/// Number of decoded frames between two samples.
pub fn frame_step(fps: f64, interval_seconds: f64) -> u64 {
    let step = (fps * interval_seconds).round();
    if step >= 1.0 {
        step as u64
    } else {
        1
    }
}

/// Reported fps if usable, otherwise [`DEFAULT_FPS`].
pub fn effective_fps(reported: Option<f64>) -> f64 {
    reported
        .filter(|fps| fps.is_finite() && *fps > 0.0)
        .unwrap_or(DEFAULT_FPS)
}

/// Validate a sampling interval.
pub fn validate_interval(interval_seconds: f64) -> MediaResult<()> {
    if interval_seconds.is_finite() && interval_seconds > 0.0 {
        Ok(())
    } else {
        Err(MediaError::InvalidInterval(interval_seconds))
    }
}

/// Forward-only sampler over a [`VideoSource`].
///
/// The source is closed exactly once, when the stream ends, when decoding
/// fails, or on [`FrameSampler::close`]. Dropping the sampler drops the
/// source without awaiting its shutdown.
pub struct FrameSampler {
    source: Box<dyn VideoSource>,
    fps: f64,
    step: u64,
    decoded: u64,
    finished: bool,
}

impl std::fmt::Debug for FrameSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSampler")
            .field("fps", &self.fps)
            .field("step", &self.step)
            .field("decoded", &self.decoded)
            .field("finished", &self.finished)
            .finish()
    }
}

impl FrameSampler {
    /// Wrap an open source.
    pub fn new(source: Box<dyn VideoSource>, interval_seconds: f64) -> MediaResult<Self> {
        validate_interval(interval_seconds)?;

        if source.fps().filter(|fps| fps.is_finite() && *fps > 0.0).is_none() {
            debug!(reported = ?source.fps(), "Stream reports no usable frame rate, assuming {DEFAULT_FPS}");
        }
        let fps = effective_fps(source.fps());
        let step = frame_step(fps, interval_seconds);

        Ok(Self {
            source,
            fps,
            step,
            decoded: 0,
            finished: false,
        })
    }

    /// Open `path` with `decoder` and sample it every `interval_seconds`.
    pub async fn open(
        decoder: &dyn VideoDecoder,
        path: &Path,
        interval_seconds: f64,
    ) -> MediaResult<Self> {
        validate_interval(interval_seconds)?;
        let source = decoder.open(path).await?;
        Self::new(source, interval_seconds)
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Next sampled frame, or `None` when the stream is exhausted.
    pub async fn next(&mut self) -> MediaResult<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let image = match self.source.next_frame().await {
                Ok(Some(image)) => image,
                Ok(None) => {
                    self.close().await;
                    return Ok(None);
                }
                Err(e) => {
                    self.close().await;
                    return Err(e);
                }
            };

            let frame_index = self.decoded;
            self.decoded += 1;

            if frame_index % self.step == 0 {
                return Ok(Some(Frame {
                    image,
                    timestamp: frame_index as f64 / self.fps,
                    frame_index,
                }));
            }
        }
    }

    /// Stop sampling and release the source.
    pub async fn close(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.source.close().await;
        debug!(decoded = self.decoded, "Closed video stream");
    }
}
