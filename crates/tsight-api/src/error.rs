//! API error types.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use tsight_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(e) => e.status(),
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Pipeline(PipelineError::NoFramesExtracted) => Some("no_frames"),
            ApiError::Pipeline(PipelineError::Timeout(_)) => Some("timeout"),
            ApiError::Pipeline(e) if e.is_client_error() => Some("invalid_media"),
            ApiError::RateLimited => Some("rate_limited"),
            _ => None,
        }
    }

    /// Client-facing detail. Server-side failures are prefixed and, in
    /// production, replaced by a generic message.
    fn detail(&self, production: bool) -> String {
        let status = self.status_code();
        if !status.is_server_error() || status == StatusCode::GATEWAY_TIMEOUT {
            return self.to_string();
        }
        if production {
            "An internal error occurred".to_string()
        } else {
            format!("Analysis failed: {self}")
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }

        let production = std::env::var("ENVIRONMENT")
            .map(|env| env.to_lowercase() == "production")
            .unwrap_or(false);

        let body = ErrorResponse {
            detail: self.detail(production),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
