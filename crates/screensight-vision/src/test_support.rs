//! 단위 테스트용 가짜 협력자.

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use screensight_core::error::CoreError;
use screensight_core::models::frame::Frame;
use screensight_core::models::geometry::Polygon;
use screensight_core::ports::clock::Clock;
use screensight_core::ports::screen_source::ScreenSource;
use screensight_core::ports::text_recognizer::{
    RecognitionError, RecognizedText, RecognizerFactory, TextRecognizer,
    TRANSIENT_ALLOCATOR_MARKER,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::decoder::FORMAT_RGBA_8888;

/// RGBA 픽셀로 `screencap` 원시 출력 만들기
pub fn encode_capture(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(12 + rgba.len());
    raw.extend_from_slice(&width.to_le_bytes());
    raw.extend_from_slice(&height.to_le_bytes());
    raw.extend_from_slice(&FORMAT_RGBA_8888.to_le_bytes());
    raw.extend_from_slice(rgba);
    raw
}

/// 프레임 → `screencap` 원시 출력
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let rgba: Vec<u8> = frame
        .image()
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2], 255])
        .collect();
    encode_capture(frame.width(), frame.height(), &rgba)
}

/// 단색 프레임
pub fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
    Frame::new(RgbImage::from_pixel(width, height, Rgb(rgb))).unwrap()
}

/// 인식 결과 1건
pub fn text_at(x0: i32, y0: i32, x1: i32, y1: i32, text: &str) -> RecognizedText {
    RecognizedText {
        polygon: Polygon::from_corners(x0, y0, x1, y1),
        text: text.to_string(),
        confidence: 0.9,
    }
}

pub fn transient() -> RecognitionError {
    RecognitionError::Transient(format!("(ResourceExhausted) {TRANSIENT_ALLOCATOR_MARKER}"))
}

/// 인식기 인스턴스 사이에서 공유되는 응답 대본
///
/// 대본이 비면 `fallback`을 반환한다.
#[derive(Default)]
pub struct Script {
    outcomes: Mutex<VecDeque<Result<Vec<RecognizedText>, RecognitionError>>>,
    fallback: Mutex<Vec<RecognizedText>>,
    calls: AtomicUsize,
    /// 받은 입력 이미지 크기
    seen_sizes: Mutex<Vec<(u32, u32)>>,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn always(texts: Vec<RecognizedText>) -> Arc<Self> {
        let script = Self::new();
        *script.fallback.lock() = texts;
        script
    }

    pub fn push(&self, outcome: Result<Vec<RecognizedText>, RecognitionError>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_sizes(&self) -> Vec<(u32, u32)> {
        self.seen_sizes.lock().clone()
    }

    fn next(&self, image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_sizes.lock().push((image.width(), image.height()));
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.lock().clone()))
    }
}

/// 대본대로 응답하는 인식기
pub struct ScriptedRecognizer {
    script: Arc<Script>,
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        self.script.next(image)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// 생성 횟수를 세는 인식기 팩토리
pub struct ScriptedFactory {
    script: Arc<Script>,
    created: AtomicUsize,
    /// 다음 `create` 호출들이 순서대로 반환할 오류
    create_failures: Mutex<VecDeque<RecognitionError>>,
}

impl ScriptedFactory {
    pub fn new(script: Arc<Script>) -> Arc<Self> {
        Arc::new(Self {
            script,
            created: AtomicUsize::new(0),
            create_failures: Mutex::new(VecDeque::new()),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn fail_next_create(&self, error: RecognitionError) {
        self.create_failures.lock().push_back(error);
    }
}

impl RecognizerFactory for ScriptedFactory {
    fn create(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.create_failures.lock().pop_front() {
            return Err(error);
        }
        Ok(Arc::new(ScriptedRecognizer {
            script: self.script.clone(),
        }))
    }
}

/// 고정 프레임을 반환하는 캡처 소스
pub struct StaticScreenSource {
    raw: Vec<u8>,
    captures: AtomicUsize,
    devices: Mutex<Vec<Option<String>>>,
}

impl StaticScreenSource {
    pub fn new(frame: &Frame) -> Arc<Self> {
        Self::from_raw(encode_frame(frame))
    }

    pub fn from_raw(raw: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            raw,
            captures: AtomicUsize::new(0),
            devices: Mutex::new(Vec::new()),
        })
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn devices(&self) -> Vec<Option<String>> {
        self.devices.lock().clone()
    }
}

#[async_trait]
impl ScreenSource for StaticScreenSource {
    async fn capture(&self, device_id: Option<&str>) -> Result<Vec<u8>, CoreError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.devices.lock().push(device_id.map(str::to_string));
        Ok(self.raw.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// `sleep` 호출 시 즉시 시간을 전진시키는 수동 시계
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}
