//! API 라우트 정의.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// API 라우트 생성
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 영역 분석
        .route("/ocr", post(handlers::vision::ocr))
        // 템플릿 검색
        .route("/find_image", post(handlers::vision::find_image))
        // 텍스트 대기
        .route("/wait_for_text", post(handlers::vision::wait_for_text))
        // 상태 확인
        .route("/health", get(handlers::health::get_health))
}
