//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 캡처 명령, 텍스트 인식 엔진, 시계는 외부 협력자로 취급하며
//! `screensight-app`에서 `Arc<dyn T>`로 와이어링한다.

pub mod clock;
pub mod screen_source;
pub mod text_recognizer;
