//! HTTP client for the TrueSight detector service.
//!
//! [`DetectorClient`] implements [`tsight_pipeline::SignalAnalyzer`] by
//! calling one endpoint per detector and degrading components whose call
//! fails.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{DetectorClient, FILENAME_HEADER, SOURCE_DETECTOR};
pub use config::MlClientConfig;
pub use error::{MlError, MlResult};
pub use types::HealthResponse;
