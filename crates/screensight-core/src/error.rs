//! screensight 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 전파하거나 `From` 변환으로 래핑한다.
//! 영역이 프레임 밖으로 벗어난 경우는 에러가 아니라 빈 결과로 처리한다.

use thiserror::Error;

use crate::ports::text_recognizer::RecognitionError;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 캡처 페이로드 손상/잘림 또는 미지원 픽셀 포맷 (재시도하지 않음)
    #[error("프로토콜 에러: {0}")]
    Protocol(String),

    /// 인식 엔진 일시적 자원 고갈 (엔진 재초기화 후 재시도 대상)
    #[error("인식 엔진 일시 오류: {0}")]
    RecognitionTransient(String),

    /// 재시도 한도 초과
    #[error("인식 재시도 {attempts}회 모두 실패: {last_error}")]
    RecognitionExhausted {
        /// 수행한 시도 횟수
        attempts: u32,
        /// 마지막 일시 오류 메시지
        last_error: String,
    },

    /// 재시도 대상이 아닌 인식 엔진 오류
    #[error("인식 엔진 오류: {0}")]
    Recognition(String),

    /// 등록되지 않은 템플릿 이름
    #[error("템플릿 미발견: {0}")]
    TemplateNotFound(String),

    /// 캡처 협력자 실패 (프로세스 실행 실패, 비정상 종료)
    #[error("캡처 실패: {0}")]
    Capture(String),

    /// 요청 파라미터 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 이미지 인코딩/디코딩 실패
    #[error("이미지 에러: {0}")]
    Image(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 유효성 검증 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<RecognitionError> for CoreError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::Transient(msg) => CoreError::RecognitionTransient(msg),
            RecognitionError::Fatal(msg) => CoreError::Recognition(msg),
        }
    }
}

impl From<image::ImageError> for CoreError {
    fn from(err: image::ImageError) -> Self {
        CoreError::Image(err.to_string())
    }
}
