//! 템플릿 매치 결과.

use serde::{Deserialize, Serialize};

use super::geometry::Polygon;

/// 템플릿이 발견된 위치 (축 정렬 4점 다각형).
///
/// 유사도 점수는 임계값 필터링에만 쓰이고 결과에는 포함하지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Match {
    pub polygon: Polygon,
}

impl Match {
    /// 좌상단 `(x, y)`, 크기 `w x h` 박스
    pub fn at(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            polygon: Polygon::from_corners(x, y, x + w, y + h),
        }
    }

    pub fn iou(&self, other: &Match) -> f64 {
        self.polygon.box_iou(&other.polygon)
    }
}

/// 템플릿 탐색 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    /// 하나 이상 발견 여부
    pub found: bool,
    /// 중복 제거된 매치 목록 (발견 순서)
    pub boxes: Vec<Match>,
}

impl FindResult {
    pub fn new(boxes: Vec<Match>) -> Self {
        Self {
            found: !boxes.is_empty(),
            boxes,
        }
    }
}
