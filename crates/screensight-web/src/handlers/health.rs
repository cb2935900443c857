//! 상태 확인 핸들러.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

/// 서버 상태
#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    /// 로드된 템플릿 수
    pub templates: usize,
    /// 현재 텍스트 인식기
    pub recognizer: String,
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok",
        templates: state.service.template_count(),
        recognizer: state.service.recognizer_name(),
    })
}
