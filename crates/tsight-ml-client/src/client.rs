//! Detector service HTTP client.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use tsight_models::{Component, SignalBundle, SourcePrediction};
use tsight_pipeline::{ImagePayload, PipelineResult, SignalAnalyzer};

use crate::config::MlClientConfig;
use crate::error::{MlError, MlResult};
use crate::types::HealthResponse;

/// Detector key for the unweighted source-model prediction.
pub const SOURCE_DETECTOR: &str = "source";

/// Header carrying the upload's original filename.
pub const FILENAME_HEADER: &str = "x-filename";

/// Runs every detector against one image over HTTP.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    http: Client,
    config: MlClientConfig,
}

impl DetectorClient {
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    pub fn config(&self) -> &MlClientConfig {
        &self.config
    }

    /// Check if the detector service is healthy.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.is_healthy(),
                    Err(e) => {
                        warn!("Detector health response unreadable: {}", e);
                        false
                    }
                }
            }
            Ok(response) => {
                warn!("Detector health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Detector health check error: {}", e);
                false
            }
        }
    }

    /// Run one detector and return its raw JSON result.
    pub async fn detect(&self, detector: &str, image: &ImagePayload) -> MlResult<Value> {
        let url = self.config.detect_url(detector);
        debug!(detector, bytes = image.bytes.len(), "Sending detection request");

        let response = self
            .with_retry(|| async {
                let mut request = self
                    .http
                    .post(&url)
                    .header(CONTENT_TYPE, image.content_type.as_str())
                    .body(image.bytes.clone());
                if let Some(filename) = &image.filename {
                    request = request.header(FILENAME_HEADER, filename.as_str());
                }

                let response = request.send().await.map_err(MlError::Network)?;
                if response.status().is_server_error() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(MlError::ServiceUnavailable(format!(
                        "detector returned {}: {}",
                        status, body
                    )));
                }
                Ok(response)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "detector returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| MlError::InvalidResponse(format!("{detector}: {e}")))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(200 * 2u64.pow(attempt));
                    warn!(
                        "Detector request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl SignalAnalyzer for DetectorClient {
    async fn analyze(&self, image: &ImagePayload) -> PipelineResult<SignalBundle> {
        let components = join_all(Component::ALL.iter().map(|component| async move {
            (*component, self.detect(component.as_str(), image).await)
        }));
        let source = self.detect(SOURCE_DETECTOR, image);
        let (components, source) = futures::join!(components, source);

        let mut bundle = SignalBundle::new();
        for (component, result) in components {
            match result {
                Ok(value) => bundle.insert_raw(component, value),
                Err(e) => {
                    warn!(component = %component, error = %e, "Detector degraded");
                    bundle = bundle.with_degraded(component, e.to_string());
                }
            }
        }

        bundle.source = match source {
            Ok(value) => serde_json::from_value::<SourcePrediction>(value)
                .map_err(|e| warn!(error = %e, "Source prediction unreadable"))
                .ok(),
            Err(e) => {
                warn!(error = %e, "Source prediction failed");
                None
            }
        };

        Ok(bundle)
    }

    async fn ready(&self) -> bool {
        self.health_check().await
    }
}
