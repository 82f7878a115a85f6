//! Video decoding and frame sampling for the TrueSight engine.
//!
//! This crate provides:
//! - FFprobe stream inspection
//! - FFmpeg raw RGB frame decoding behind the [`VideoDecoder`] seam
//! - Fixed-interval frame sampling with a documented fps fallback

pub mod command;
pub mod error;
pub mod probe;
pub mod sampler;
pub mod source;

pub use command::FfmpegCommand;
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use sampler::{
    effective_fps, frame_step, validate_interval, Frame, FrameSampler, DEFAULT_FPS,
};
pub use source::{FfmpegDecoder, FfmpegSource, VideoDecoder, VideoSource, DEFAULT_MAX_PIXELS};

/// Re-exported so callers can build frames without depending on `image`.
pub use image::RgbImage;
