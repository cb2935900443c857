//! 텍스트 인식 엔진 포트.
//!
//! 인식 엔진은 블랙박스 협력자다. 픽셀 영역을 받아
//! `(다각형, 텍스트, 신뢰도)` 목록을 돌려주며, 내부 자원 고갈 시
//! 재시도 가능한 일시 오류를 낼 수 있다.
//!
//! 일시 오류 여부는 메시지 문자열이 아니라 [`RecognitionError`] 변형으로 구분한다.
//! 메시지로만 실패를 알리는 엔진을 감싸는 어댑터는 [`classify_engine_message`]를 쓴다.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::geometry::Polygon;

/// 엔진의 할당기 고갈 메시지에 포함되는 고정 문자열
pub const TRANSIENT_ALLOCATOR_MARKER: &str = "No allocator found for the place";

/// 인식 결과 1건 (입력 이미지 좌표계)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub polygon: Polygon,
    pub text: String,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
}

/// 인식 엔진 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// 일시적 할당기 고갈: 엔진 재초기화 후 재시도
    #[error("일시적 할당기 고갈: {0}")]
    Transient(String),

    /// 그 외 모든 엔진 실패: 즉시 전파
    #[error("인식 실패: {0}")]
    Fatal(String),
}

impl RecognitionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RecognitionError::Transient(_))
    }
}

/// 메시지 기반 엔진 에러를 타입 에러로 분류
pub fn classify_engine_message(message: impl Into<String>) -> RecognitionError {
    let message = message.into();
    if message.contains(TRANSIENT_ALLOCATOR_MARKER) {
        RecognitionError::Transient(message)
    } else {
        RecognitionError::Fatal(message)
    }
}

/// 텍스트 인식기: 블로킹 호출이므로 워커 풀에서 실행한다
pub trait TextRecognizer: Send + Sync {
    /// 이미지에서 텍스트 인스턴스 추출 (엔진 출력 순서 유지)
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError>;

    /// 인식기 이름 (예: "tesseract")
    fn name(&self) -> &str;
}

/// 인식기 생성기: 프로세스 시작 시와 재초기화 시 호출된다
pub trait RecognizerFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError>;
}
