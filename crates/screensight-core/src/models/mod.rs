//! 도메인 모델.
//!
//! 프레임/영역/인식 존/템플릿 매치/폴링 결과와 서비스 요청 구조체를 정의한다.

pub mod frame;
pub mod geometry;
pub mod matching;
pub mod poll;
pub mod request;
pub mod zone;
