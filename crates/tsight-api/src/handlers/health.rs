//! Service banner and health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::state::AppState;

/// Service banner.
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// Root endpoint listing the public routes.
pub async fn root() -> Json<RootResponse> {
    let endpoints = BTreeMap::from([
        ("health", "/health"),
        ("ready", "/ready"),
        ("analyze_image", "/analyze/image"),
        ("analyze_video", "/analyze/video"),
    ]);

    Json(RootResponse {
        message: "TrueSight AI Engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        endpoints,
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub detectors: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks that the detector backend is reachable.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let start = Instant::now();
    let detectors = if state.analyzer.ready().await {
        CheckStatus::ok(start.elapsed().as_millis() as u64)
    } else {
        CheckStatus::error("detector service unreachable")
    };

    let all_ok = detectors.status == "ok";
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks { detectors },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
