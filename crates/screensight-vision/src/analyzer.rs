//! 영역 텍스트 분석기.
//!
//! 프레임의 사각 영역을 잘라 인식 엔진에 넘기고, 인식된 각 텍스트 인스턴스에
//! 글자색(Otsu 전경 평균)과 배경색(다각형 바깥 링 최빈값)을 붙여 [`Zone`]으로 만든다.
//!
//! 엔진이 일시 오류(할당기 고갈)를 내면 엔진을 재초기화하고 최대
//! [`MAX_RECOGNITION_ATTEMPTS`]회까지 다시 시도한다. 재초기화 자체의 일시 오류도
//! 같은 한도 안에서 흡수한다. 그 외 엔진 오류는 즉시 전파한다.
//!
//! 모든 메서드는 블로킹이다. 비동기 호출자는 워커 풀에서 실행한다.

use image::RgbImage;
use screensight_core::error::CoreError;
use screensight_core::models::frame::{Frame, Rect, Region};
use screensight_core::models::geometry::Polygon;
use screensight_core::models::zone::{ColorBucket, Zone};
use screensight_core::ports::text_recognizer::{RecognitionError, RecognizedText};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::color::ColorClassifier;
use crate::engine::{Attempt, RecognitionEngine};
use crate::pixel;

/// 인식 최대 시도 횟수 (첫 시도 포함)
pub const MAX_RECOGNITION_ATTEMPTS: u32 = 5;

/// 텍스트가 하나도 인식되지 않은 영역의 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRegion {
    /// 결과에서 생략
    Omit,
    /// 영역 전체를 덮는 요약 존 1개 (텍스트 없음, 배경색만)
    Summarize,
}

/// 영역 분석기
pub struct RegionAnalyzer {
    engine: Arc<RecognitionEngine>,
    classifier: ColorClassifier,
    /// 재초기화 후 추가 대기
    retry_backoff: Duration,
}

impl RegionAnalyzer {
    pub fn new(engine: Arc<RecognitionEngine>) -> Self {
        Self {
            engine,
            classifier: ColorClassifier::new(),
            retry_backoff: Duration::ZERO,
        }
    }

    /// 재시도 전 대기 시간 설정
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn engine(&self) -> &Arc<RecognitionEngine> {
        &self.engine
    }

    /// 영역 1개 분석
    ///
    /// 프레임 밖으로 완전히 벗어난 영역은 빈 결과다 (에러 아님).
    pub fn analyze(&self, frame: &Frame, region: &Region) -> Result<Vec<Zone>, CoreError> {
        match region.clamp_to(frame.width(), frame.height()) {
            Some(rect) => self.analyze_rect(frame, rect),
            None => {
                debug!(?region, "퇴화 영역 건너뜀");
                Ok(Vec::new())
            }
        }
    }

    /// 여러 영역을 호출자 순서대로 분석해 결과를 이어 붙인다
    pub fn analyze_all(
        &self,
        frame: &Frame,
        regions: &[Region],
        empty: EmptyRegion,
    ) -> Result<Vec<Zone>, CoreError> {
        let mut zones = Vec::new();
        for region in regions {
            let Some(rect) = region.clamp_to(frame.width(), frame.height()) else {
                debug!(?region, "퇴화 영역 건너뜀");
                continue;
            };

            let found = self.analyze_rect(frame, rect)?;
            if found.is_empty() && empty == EmptyRegion::Summarize {
                zones.push(self.summarize(frame, rect));
            } else {
                zones.extend(found);
            }
        }
        Ok(zones)
    }

    /// 영역 전체 평균색으로 만든 요약 존
    pub fn summarize(&self, frame: &Frame, rect: Rect) -> Zone {
        let roi = pixel::crop(frame, rect);
        let mean = pixel::mean_rgb(roi.pixels().map(|p| p.0));
        Zone {
            polygon: Polygon::from_corners(
                rect.x as i32,
                rect.y as i32,
                rect.right() as i32,
                rect.bottom() as i32,
            ),
            text: String::new(),
            score: 1.0,
            foreground: None,
            background: self.classifier.classify(mean),
        }
    }

    fn analyze_rect(&self, frame: &Frame, rect: Rect) -> Result<Vec<Zone>, CoreError> {
        let roi = pixel::crop(frame, rect);
        let found = self.recognize_with_retry(&roi)?;

        let zones: Vec<Zone> = found
            .into_iter()
            .filter_map(|text| self.annotate(frame, rect, text))
            .collect();

        debug!(?rect, zones = zones.len(), "영역 분석 완료");
        Ok(zones)
    }

    /// 일시 오류 시 엔진 재초기화 후 재시도
    fn recognize_with_retry(&self, roi: &RgbImage) -> Result<Vec<RecognizedText>, CoreError> {
        let mut last_error = String::new();

        for attempt in 1..=MAX_RECOGNITION_ATTEMPTS {
            let Attempt { generation, result } = self.engine.recognize(roi);
            match result {
                Ok(found) => return Ok(found),
                Err(RecognitionError::Transient(msg)) => {
                    warn!(
                        attempt,
                        max = MAX_RECOGNITION_ATTEMPTS,
                        "인식 엔진 일시 오류, 재초기화 후 재시도: {msg}"
                    );
                    last_error = msg;
                    // 재초기화의 일시 오류도 시도 1회로 센다
                    match self.engine.reinitialize(generation) {
                        Ok(_) => {}
                        Err(RecognitionError::Transient(reinit_msg)) => {
                            warn!(attempt, "인식 엔진 재초기화 일시 오류: {reinit_msg}");
                            last_error = reinit_msg;
                        }
                        Err(fatal) => return Err(fatal.into()),
                    }
                    if !self.retry_backoff.is_zero() {
                        std::thread::sleep(self.retry_backoff);
                    }
                }
                Err(fatal) => return Err(fatal.into()),
            }
        }

        error!(
            attempts = MAX_RECOGNITION_ATTEMPTS,
            "인식 재시도 소진: {last_error}"
        );
        Err(CoreError::RecognitionExhausted {
            attempts: MAX_RECOGNITION_ATTEMPTS,
            last_error,
        })
    }

    /// 인식 결과 1건 → 색상이 붙은 존 (바운딩 박스가 퇴화하면 None)
    fn annotate(&self, frame: &Frame, rect: Rect, found: RecognizedText) -> Option<Zone> {
        let polygon = found.polygon.translate(rect.x as i32, rect.y as i32);

        let (min_x, min_y, max_x, max_y) = polygon.bounds();
        let bounds = Region::new(min_x, min_y, max_x, max_y);
        let Some(bbox) = bounds.clamp_to(frame.width(), frame.height()) else {
            debug!(?polygon, "퇴화 바운딩 박스 존 건너뜀");
            return None;
        };

        let patch = pixel::crop(frame, bbox);
        let foreground = self.classifier.classify(pixel::foreground_mean(&patch));

        let ring = pixel::ring_pixels(frame, &polygon);
        let background = if ring.is_empty() {
            ColorBucket::Gray
        } else {
            self.classifier.classify_majority(ring)
        };

        Some(Zone {
            polygon,
            text: found.text,
            score: found.confidence,
            foreground: Some(foreground),
            background,
        })
    }
}
