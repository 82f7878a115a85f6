//! Image and video analysis handlers.

use axum::extract::{Multipart, Query, State};
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::info;
use tsight_models::{ImageAnalysis, VideoResult};
use tsight_pipeline::{ImagePayload, RequestLogger, TempVideoFile};

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Multipart field carrying the image upload.
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the video upload.
pub const VIDEO_FIELD: &str = "video";

/// Query parameters for video analysis.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    pub interval_seconds: Option<f64>,
}

fn logger_for(request_id: Option<Extension<RequestId>>, operation: &str) -> RequestLogger {
    match request_id {
        Some(Extension(RequestId(id))) => RequestLogger::new(&id, operation),
        None => RequestLogger::generate(operation),
    }
}

fn has_media_type(content_type: Option<&str>, prefix: &str) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with(prefix))
        .unwrap_or(false)
}

/// Analyze one uploaded image.
pub async fn analyze_image(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImageAnalysis>> {
    let logger = logger_for(request_id, "image_analysis");

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !has_media_type(content_type.as_deref(), "image/") {
            return Err(ApiError::bad_request("File must be an image"));
        }
        let filename = field.file_name().map(str::to_string);
        info!(
            request_id = %logger.request_id(),
            filename = ?filename,
            "Received image analysis request"
        );

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded image is empty"));
        }

        let mut payload = ImagePayload::new(bytes.to_vec(), content_type.unwrap_or_default());
        if let Some(filename) = filename {
            payload = payload.with_filename(filename);
        }

        let analysis = state.images.analyze(&payload).await.map_err(|e| {
            logger.log_error(&e.to_string());
            ApiError::from(e)
        })?;
        logger.log_completion(&format!("truth score {}", analysis.truth_score));
        return Ok(Json(analysis));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{IMAGE_FIELD}'"
    )))
}

/// Analyze one uploaded video. The upload is streamed to a temp file that
/// is removed when the handler returns or is dropped.
pub async fn analyze_video(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
    request_id: Option<Extension<RequestId>>,
    mut multipart: Multipart,
) -> ApiResult<Json<VideoResult>> {
    let logger = logger_for(request_id, "video_analysis");
    let config = state.video.config();
    let interval = query
        .interval_seconds
        .unwrap_or(config.frame_interval_seconds);
    tsight_media::validate_interval(interval).map_err(tsight_pipeline::PipelineError::from)?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        if !has_media_type(field.content_type(), "video/") {
            return Err(ApiError::bad_request("File must be a video"));
        }
        info!(
            request_id = %logger.request_id(),
            filename = ?field.file_name(),
            "Received video analysis request"
        );

        let mut upload = TempVideoFile::create(&config.work_dir, field.file_name())?;
        while let Some(chunk) = field.chunk().await? {
            upload.write_chunk(&chunk).await?;
        }
        upload.finish().await?;

        if upload.bytes_written() == 0 {
            return Err(ApiError::bad_request("Uploaded video is empty"));
        }
        logger.log_progress(&format!("saved {} bytes", upload.bytes_written()));

        // Cancellation comes from dropping this future; the sender only
        // keeps the channel open for the pipeline's lifetime.
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let result = state
            .video
            .analyze_video_logged(upload.path(), interval, cancel_rx, &logger)
            .await?;
        return Ok(Json(result));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{VIDEO_FIELD}'"
    )))
}
