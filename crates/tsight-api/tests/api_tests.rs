//! Router tests against fake detectors and a fake video decoder.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tsight_api::{create_router, ApiConfig, AppState};
use tsight_media::{MediaResult, RgbImage, VideoDecoder, VideoSource};
use tsight_models::{ClipSignal, SignalBundle};
use tsight_pipeline::{ImagePayload, PipelineConfig, PipelineError, PipelineResult, SignalAnalyzer};

const BOUNDARY: &str = "tsight-test-boundary";

struct FakeAnalyzer {
    ready: bool,
    fail: bool,
}

#[async_trait]
impl SignalAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _image: &ImagePayload) -> PipelineResult<SignalBundle> {
        if self.fail {
            return Err(PipelineError::analyzer("detectors offline"));
        }
        Ok(SignalBundle::new().with_clip(ClipSignal {
            ai_generated_probability: 10.0,
            real_probability: Some(90.0),
        }))
    }

    async fn ready(&self) -> bool {
        self.ready
    }
}

struct FakeSource {
    remaining: u64,
}

#[async_trait]
impl VideoSource for FakeSource {
    fn fps(&self) -> Option<f64> {
        Some(30.0)
    }

    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(RgbImage::new(4, 4)))
    }

    async fn close(&mut self) {}
}

struct FakeDecoder {
    frames: u64,
    opened: Arc<AtomicUsize>,
}

#[async_trait]
impl VideoDecoder for FakeDecoder {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        assert!(path.exists(), "upload should be on disk while decoding");
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSource {
            remaining: self.frames,
        }))
    }
}

struct TestApp {
    router: Router,
    opened: Arc<AtomicUsize>,
    work_dir: tempfile::TempDir,
}

fn test_app_with(config: ApiConfig, analyzer: FakeAnalyzer, frames: u64) -> TestApp {
    let work_dir = tempfile::tempdir().unwrap();
    let pipeline_config = PipelineConfig {
        work_dir: work_dir.path().to_path_buf(),
        ..PipelineConfig::default()
    };
    let opened = Arc::new(AtomicUsize::new(0));
    let decoder = FakeDecoder {
        frames,
        opened: opened.clone(),
    };

    let state = AppState::new(config, pipeline_config, Arc::new(analyzer), Arc::new(decoder));
    TestApp {
        router: create_router(state, None),
        opened,
        work_dir,
    }
}

fn test_app() -> TestApp {
    test_app_with(
        ApiConfig::default(),
        FakeAnalyzer {
            ready: true,
            fail: false,
        },
        90,
    )
}

fn multipart_request(uri: &str, field: &str, filename: &str, content_type: &str) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = test_app();
    let response = app.router.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "operational");
    assert_eq!(body["endpoints"]["analyze_video"], "/analyze/video");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_detector_reachability() {
    let app = test_app();
    let response = app.router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = test_app_with(
        ApiConfig::default(),
        FakeAnalyzer {
            ready: false,
            fail: false,
        },
        0,
    );
    let response = app.router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["detectors"]["status"], "error");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = test_app();
    let response = app.router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_analyze_image() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/image",
            "image",
            "photo.jpg",
            "image/jpeg",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["truthScore"], 97.0);
    assert_eq!(body["realProbability"], 97.0);
    assert_eq!(body["aiGeneratedProbability"], 3.0);
    assert_eq!(body["predictedSource"], "Unknown");
}

#[tokio::test]
async fn test_analyze_image_rejects_non_image() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/image",
            "image",
            "notes.txt",
            "text/plain",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["detail"], "File must be an image");
}

#[tokio::test]
async fn test_analyze_image_missing_field() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/image",
            "file",
            "photo.jpg",
            "image/jpeg",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_image_detector_failure_is_500() {
    let app = test_app_with(
        ApiConfig::default(),
        FakeAnalyzer {
            ready: true,
            fail: true,
        },
        0,
    );
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/image",
            "image",
            "photo.jpg",
            "image/jpeg",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("detectors offline") || detail == "An internal error occurred");
}

#[tokio::test]
async fn test_analyze_video() {
    let app = test_app();
    let opened = app.opened.clone();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(opened.load(Ordering::SeqCst), 1);

    let body = json_body(response).await;
    assert_eq!(body["framesAnalyzed"], 3);
    assert_eq!(body["truthScore"], 97.0);
    let timeline = body["frameAnalyses"].as_array().unwrap();
    let timestamps: Vec<f64> = timeline
        .iter()
        .map(|entry| entry["timestamp"].as_f64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![0.0, 1.0, 2.0]);
}

#[tokio::test]
async fn test_analyze_video_custom_interval() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video?intervalSeconds=0.5",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["framesAnalyzed"], 6);
}

#[tokio::test]
async fn test_analyze_video_invalid_interval_is_400() {
    let app = test_app();
    let opened = app.opened.clone();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video?intervalSeconds=0",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_video_without_frames_is_400() {
    let app = test_app_with(
        ApiConfig::default(),
        FakeAnalyzer {
            ready: true,
            fail: false,
        },
        0,
    );
    let work_dir = app.work_dir.path().to_path_buf();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["detail"],
        "No frames could be extracted from the video"
    );
    assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_analyze_video_rejects_non_video() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video",
            "video",
            "photo.jpg",
            "image/jpeg",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["detail"], "File must be a video");
}

#[tokio::test]
async fn test_upload_removed_after_analysis() {
    let app = test_app();
    let work_dir = app.work_dir.path().to_path_buf();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_removed_after_failed_analysis() {
    let app = test_app_with(
        ApiConfig::default(),
        FakeAnalyzer {
            ready: true,
            fail: true,
        },
        90,
    );
    let work_dir = app.work_dir.path().to_path_buf();
    let response = app
        .router
        .oneshot(multipart_request(
            "/analyze/video",
            "video",
            "clip.mp4",
            "video/mp4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let config = ApiConfig {
        api_key: Some("secret".to_string()),
        ..ApiConfig::default()
    };
    let app = test_app_with(
        config,
        FakeAnalyzer {
            ready: true,
            fail: false,
        },
        90,
    );

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            "/analyze/image",
            "image",
            "photo.jpg",
            "image/jpeg",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = multipart_request("/analyze/image", "image", "photo.jpg", "image/jpeg");
    request
        .headers_mut()
        .insert("x-api-key", "secret".parse().unwrap());
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_per_client_ip() {
    let config = ApiConfig {
        rate_limit_rps: 1,
        ..ApiConfig::default()
    };
    let app = test_app_with(
        config,
        FakeAnalyzer {
            ready: true,
            fail: false,
        },
        90,
    );

    let request = || {
        let mut request =
            multipart_request("/analyze/image", "image", "photo.jpg", "image/jpeg");
        request
            .headers_mut()
            .insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
        request
    };

    let first = app.router.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.router.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()["retry-after"], "1");
}
