//! # screensight-vision
//!
//! 원격 장치 화면 분석 크레이트.
//! 캡처 바이트 디코딩, 픽셀 색상 분류, 영역별 텍스트 인식과 색상 주석,
//! 템플릿 매칭과 중복 제거, "텍스트가 나타날 때까지 대기" 폴링을 담당한다.

pub mod adb;
pub mod analyzer;
pub mod capture;
pub mod color;
pub mod debug;
pub mod decoder;
pub mod engine;
pub mod local_recognizer;
pub mod matcher;
#[cfg(feature = "ocr")]
pub mod ocr;
pub mod pixel;
pub mod pool;
pub mod poller;
pub mod service;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_support;
