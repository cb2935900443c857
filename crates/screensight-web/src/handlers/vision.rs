//! 화면 분석 API 핸들러.
//!
//! 요청 본문은 그대로 [`VisionService`](screensight_vision::service::VisionService)에
//! 넘기고, 결과를 JSON으로 돌려준다.

use axum::extract::State;
use axum::Json;
use screensight_core::models::matching::FindResult;
use screensight_core::models::request::{FindRequest, OcrRequest, WaitRequest};
use screensight_core::models::zone::Zone;
use tracing::debug;

use crate::{error::ApiError, AppState};

/// POST /ocr
///
/// 본문이 비어 있어도(`{}`) 프레임 전체를 분석한다.
pub async fn ocr(
    State(state): State<AppState>,
    Json(req): Json<OcrRequest>,
) -> Result<Json<Vec<Zone>>, ApiError> {
    debug!(device = ?req.device_id, regions = ?req.regions.as_ref().map(Vec::len), "OCR 요청");
    let zones = state.service.ocr(&req).await?;
    Ok(Json(zones))
}

/// POST /find_image
pub async fn find_image(
    State(state): State<AppState>,
    Json(req): Json<FindRequest>,
) -> Result<Json<FindResult>, ApiError> {
    debug!(template = %req.image_name, threshold = ?req.threshold, "템플릿 검색 요청");
    let result = state.service.find_image(&req).await?;
    Ok(Json(result))
}

/// POST /wait_for_text
///
/// 시간 초과는 에러가 아니라 빈 목록이다.
pub async fn wait_for_text(
    State(state): State<AppState>,
    Json(req): Json<WaitRequest>,
) -> Result<Json<Vec<Zone>>, ApiError> {
    debug!(
        stop_words = ?req.stop_words,
        timeout = req.timeout,
        interval = req.interval,
        "텍스트 대기 요청"
    );
    let zones = state.service.wait_for_text(&req).await?;
    Ok(Json(zones))
}
