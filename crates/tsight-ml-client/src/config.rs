//! Detector client configuration.

use std::time::Duration;

/// Configuration for [`crate::DetectorClient`].
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of the detector service
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for connect errors and timeouts
    pub max_retries: u32,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ML_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: std::env::var("ML_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Detection endpoint for a detector key (`clip`, `deepfake`, ..., `source`).
    pub fn detect_url(&self, detector: &str) -> String {
        format!("{}/detect/{}", self.base_url, detector)
    }
}
