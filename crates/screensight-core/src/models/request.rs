//! 서비스 요청 구조체.
//!
//! 외부 요청 레이어(HTTP)와 `VisionService`가 공유한다. 시간 값은 초 단위 실수.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::frame::Region;
use crate::error::CoreError;

/// 단일 영역 분석 요청
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    /// 디버그 스냅샷 파일 이름
    #[serde(default)]
    pub debug_name: Option<String>,
    /// 분석 영역 (없거나 비어 있으면 전체 프레임)
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
}

/// 템플릿 탐색 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindRequest {
    /// 템플릿 이름 (파일 stem)
    pub image_name: String,
    #[serde(default)]
    pub device_id: Option<String>,
    /// 유사도 임계값 (없으면 설정 기본값)
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub debug_name: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
}

/// 텍스트 출현 대기 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitRequest {
    /// 정지 단어 (대소문자 무시 부분 일치)
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    /// 제한 시간 (초)
    pub timeout: f64,
    /// 폴링 간격 (초)
    pub interval: f64,
    #[serde(default)]
    pub debug_name: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
}

impl WaitRequest {
    pub fn timeout_duration(&self) -> Result<Duration, CoreError> {
        seconds_to_duration("timeout", self.timeout)
    }

    pub fn interval_duration(&self) -> Result<Duration, CoreError> {
        seconds_to_duration("interval", self.interval)
    }
}

/// 초 단위 실수 → `Duration` (음수, NaN, 무한대 거부)
pub fn seconds_to_duration(field: &str, secs: f64) -> Result<Duration, CoreError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(CoreError::validation(
            field,
            format!("0 이상의 유한한 초 값이어야 함: {secs}"),
        ));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| CoreError::validation(field, e.to_string()))
}

/// 요청 영역 목록 정규화: 비어 있으면 `None`
pub fn non_empty_regions(regions: Option<&[Region]>) -> Option<&[Region]> {
    regions.filter(|r| !r.is_empty())
}
