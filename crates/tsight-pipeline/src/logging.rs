//! Structured request logging utilities.
//!
//! Provides consistent, structured logging for analysis requests with
//! tracing spans and contextual information.

use tracing::{error, info, warn};
use uuid::Uuid;

/// Request logger for structured logging with consistent formatting.
///
/// Every event carries the request id and the operation
/// (`image_analysis`, `video_analysis`).
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: String,
    operation: String,
}

impl RequestLogger {
    /// Create a logger for an existing request id.
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a logger with a freshly generated request id.
    pub fn generate(operation: &str) -> Self {
        Self::new(&Uuid::new_v4().to_string(), operation)
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}
