//! 핸들러 테스트용 가짜 서비스 구성.

use async_trait::async_trait;
use image::{GrayImage, Luma, Rgb, RgbImage};
use screensight_core::error::CoreError;
use screensight_core::models::geometry::Polygon;
use screensight_core::ports::clock::TokioClock;
use screensight_core::ports::screen_source::ScreenSource;
use screensight_core::ports::text_recognizer::{
    RecognitionError, RecognizedText, RecognizerFactory, TextRecognizer,
};
use screensight_vision::decoder::FORMAT_RGBA_8888;
use screensight_vision::engine::RecognitionEngine;
use screensight_vision::pool::WorkerPool;
use screensight_vision::service::{ServiceOptions, VisionService};
use screensight_vision::templates::TemplateStore;
use std::sync::Arc;

pub const FRAME_SIZE: u32 = 48;
/// 체커 패턴이 그려진 위치
pub const PATCH_ORIGIN: (u32, u32) = (12, 20);
pub const PATCH_SIZE: u32 = 8;

fn checker(x: u32, y: u32) -> u8 {
    if (x / 2 + y / 2) % 2 == 0 {
        255
    } else {
        0
    }
}

/// 검은 바탕에 체커 패치 하나가 있는 화면
fn screen() -> RgbImage {
    let (px, py) = PATCH_ORIGIN;
    RgbImage::from_fn(FRAME_SIZE, FRAME_SIZE, |x, y| {
        if (px..px + PATCH_SIZE).contains(&x) && (py..py + PATCH_SIZE).contains(&y) {
            let v = checker(x - px, y - py);
            Rgb([v, v, v])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

fn encode(image: &RgbImage) -> Vec<u8> {
    let mut raw = Vec::new();
    raw.extend_from_slice(&image.width().to_le_bytes());
    raw.extend_from_slice(&image.height().to_le_bytes());
    raw.extend_from_slice(&FORMAT_RGBA_8888.to_le_bytes());
    for p in image.pixels() {
        raw.extend_from_slice(&[p.0[0], p.0[1], p.0[2], 255]);
    }
    raw
}

struct FixedScreen {
    raw: Vec<u8>,
}

#[async_trait]
impl ScreenSource for FixedScreen {
    async fn capture(&self, _device_id: Option<&str>) -> Result<Vec<u8>, CoreError> {
        Ok(self.raw.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct FixedRecognizer {
    texts: Vec<RecognizedText>,
}

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        Ok(self.texts.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct FixedFactory {
    texts: Vec<RecognizedText>,
}

impl RecognizerFactory for FixedFactory {
    fn create(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        Ok(Arc::new(FixedRecognizer {
            texts: self.texts.clone(),
        }))
    }
}

pub fn text_at(x0: i32, y0: i32, x1: i32, y1: i32, text: &str) -> RecognizedText {
    RecognizedText {
        polygon: Polygon::from_corners(x0, y0, x1, y1),
        text: text.to_string(),
        confidence: 0.75,
    }
}

/// 항상 `texts`를 돌려주는 인식기와 "checker" 템플릿을 가진 서비스
pub fn service_with(texts: Vec<RecognizedText>) -> Arc<VisionService> {
    let engine = RecognitionEngine::new(Arc::new(FixedFactory { texts }))
        .expect("fixed recognizer");
    let mut templates = TemplateStore::empty();
    templates.insert(
        "checker",
        GrayImage::from_fn(PATCH_SIZE, PATCH_SIZE, |x, y| Luma([checker(x, y)])),
    );

    Arc::new(VisionService::new(
        Arc::new(FixedScreen { raw: encode(&screen()) }),
        Arc::new(engine),
        templates,
        Arc::new(TokioClock),
        WorkerPool::new(2),
        ServiceOptions::default(),
    ))
}
