//! ML client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("ML service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        match self {
            MlError::ServiceUnavailable(_) => true,
            MlError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
