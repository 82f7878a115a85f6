//! Image and video analysis pipeline for the TrueSight engine.
//!
//! This crate provides:
//! - [`SignalAnalyzer`]: the per-image detector seam
//! - [`ImageAnalysisService`]: analyze + aggregate one image
//! - [`FrameFanOut`]: bounded, order-preserving per-frame analysis
//! - [`reduce`]: frame results to a video verdict
//! - [`VideoPipeline`]: sampling, fan-out and reduction under a deadline

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fanout;
pub mod image_analysis;
pub mod logging;
pub mod metrics;
pub mod reducer;
pub mod temp;
pub mod video;

pub use analyzer::{encode_jpeg, ImagePayload, SignalAnalyzer};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, ReduceError};
pub use fanout::{partition_outcomes, FrameFanOut, FrameOutcome};
pub use image_analysis::{build_analysis, ImageAnalysisService};
pub use logging::RequestLogger;
pub use reducer::{reduce, DEEPFAKE_CONFIDENCE_THRESHOLD, MAX_DEEPFAKE_FACES};
pub use temp::TempVideoFile;
pub use video::VideoPipeline;
