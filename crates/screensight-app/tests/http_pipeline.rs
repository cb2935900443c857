//! HTTP 파이프라인 통합 테스트.
//!
//! 라우터 → VisionService → 캡처 디코딩 → 인식 엔진(재초기화 포함) → JSON 응답.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use image::RgbImage;
use screensight_core::error::CoreError;
use screensight_core::models::geometry::Polygon;
use screensight_core::ports::clock::TokioClock;
use screensight_core::ports::screen_source::ScreenSource;
use screensight_core::ports::text_recognizer::{
    classify_engine_message, RecognitionError, RecognizedText, RecognizerFactory, TextRecognizer,
    TRANSIENT_ALLOCATOR_MARKER,
};
use screensight_vision::debug::DebugSnapshots;
use screensight_vision::decoder::FORMAT_RGBA_8888;
use screensight_vision::engine::RecognitionEngine;
use screensight_vision::pool::WorkerPool;
use screensight_vision::service::{ServiceOptions, VisionService};
use screensight_vision::templates::TemplateStore;
use screensight_web::{build_router, AppState};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 32;

/// 파란 바탕에 흰 줄이 있는 화면
struct BannerScreen {
    captures: AtomicUsize,
}

impl BannerScreen {
    fn raw() -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&WIDTH.to_le_bytes());
        raw.extend_from_slice(&HEIGHT.to_le_bytes());
        raw.extend_from_slice(&FORMAT_RGBA_8888.to_le_bytes());
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let on_text = (8..40).contains(&x) && (10..14).contains(&y);
                let px = if on_text {
                    [250, 250, 250, 255]
                } else {
                    [20, 40, 200, 255]
                };
                raw.extend_from_slice(&px);
            }
        }
        raw
    }
}

#[async_trait]
impl ScreenSource for BannerScreen {
    async fn capture(&self, _device_id: Option<&str>) -> Result<Vec<u8>, CoreError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(Self::raw())
    }

    fn name(&self) -> &str {
        "banner"
    }
}

/// 처음 `failures`번은 할당자 오류를 내는 엔진
struct FlakyRecognizer {
    remaining_failures: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl TextRecognizer for FlakyRecognizer {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(classify_engine_message(format!(
                "onnxruntime: {TRANSIENT_ALLOCATOR_MARKER} OrtMemoryInfo"
            )));
        }
        Ok(vec![RecognizedText {
            polygon: Polygon::from_corners(6, 8, 42, 16),
            text: "Mission Complete".to_string(),
            confidence: 0.93,
        }])
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

struct FlakyFactory {
    remaining_failures: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
    created: AtomicUsize,
}

impl RecognizerFactory for FlakyFactory {
    fn create(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FlakyRecognizer {
            remaining_failures: self.remaining_failures.clone(),
            calls: self.calls.clone(),
        }))
    }
}

struct Harness {
    app: Router,
    factory: Arc<FlakyFactory>,
    screen: Arc<BannerScreen>,
    service: Arc<VisionService>,
}

fn harness(failures: usize, snapshots: DebugSnapshots) -> Harness {
    let factory = Arc::new(FlakyFactory {
        remaining_failures: Arc::new(AtomicUsize::new(failures)),
        calls: Arc::new(AtomicUsize::new(0)),
        created: AtomicUsize::new(0),
    });
    let screen = Arc::new(BannerScreen {
        captures: AtomicUsize::new(0),
    });
    let engine = RecognitionEngine::new(factory.clone()).unwrap();
    let options = ServiceOptions {
        cache_ttl: Duration::from_secs(30),
        snapshots,
        ..ServiceOptions::default()
    };
    let service = Arc::new(VisionService::new(
        screen.clone(),
        Arc::new(engine),
        TemplateStore::empty(),
        Arc::new(TokioClock),
        WorkerPool::new(2),
        options,
    ));

    Harness {
        app: build_router(AppState::new(service.clone())),
        factory,
        screen,
        service,
    }
}

async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn ocr_recovers_from_transient_failures() {
    let h = harness(2, DebugSnapshots::disabled());

    let (status, body) = post_json(&h.app, "/ocr", "{}").await;

    assert_eq!(status, StatusCode::OK);
    let zones = body.as_array().unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0]["text"], "Mission Complete");
    assert_eq!(zones[0]["box"], serde_json::json!([[6, 8], [42, 8], [42, 16], [6, 16]]));
    assert_eq!(zones[0]["avg_color"], "white");
    assert_eq!(zones[0]["bg_color"], "blue");

    // 최초 생성 1회 + 실패마다 재초기화 1회
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 3);
    assert_eq!(h.factory.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn ocr_gives_up_after_five_attempts() {
    let h = harness(usize::MAX, DebugSnapshots::disabled());

    let (status, body) = post_json(&h.app, "/ocr", "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().contains('5'));
    assert_eq!(h.factory.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn repeated_ocr_reuses_cached_frame() {
    let h = harness(0, DebugSnapshots::disabled());

    post_json(&h.app, "/ocr", "{}").await;
    post_json(&h.app, "/ocr", r#"{"regions": [{"x0": 0, "y0": 0, "x1": 32, "y1": 32}]}"#).await;

    assert_eq!(h.screen.captures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wait_for_text_always_captures_fresh() {
    let h = harness(0, DebugSnapshots::disabled());

    post_json(&h.app, "/ocr", "{}").await;
    let (status, body) = post_json(
        &h.app,
        "/wait_for_text",
        r#"{"stop_words": ["complete"], "timeout": 1.0, "interval": 0.05}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(h.screen.captures.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wait_for_text_rejects_negative_interval() {
    let h = harness(0, DebugSnapshots::disabled());

    let (status, body) = post_json(
        &h.app,
        "/wait_for_text",
        r#"{"stop_words": ["x"], "timeout": 1.0, "interval": -0.5}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("interval"));
}

#[tokio::test]
async fn ocr_writes_debug_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(0, DebugSnapshots::new(dir.path(), true));

    let (status, _) = post_json(&h.app, "/ocr", r#"{"debug_name": "banner"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let saved = image::open(dir.path().join("banner.png")).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (WIDTH, HEIGHT));
}

#[tokio::test]
async fn shutdown_fails_later_recognition() {
    let h = harness(0, DebugSnapshots::disabled());
    h.service.shutdown();

    let (status, body) = post_json(&h.app, "/ocr", "{}").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
}
