//! 프레임 좌표계 도형.

use serde::{Deserialize, Serialize};

/// 4점 다각형 (프레임 좌표, 시계 방향)
///
/// 직렬화 형식은 `[[x, y], [x, y], [x, y], [x, y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub [[i32; 2]; 4]);

impl Polygon {
    /// 좌상단 (x0, y0), 우하단 (x1, y1) 축 정렬 사각형
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self([[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    /// 꼭짓점 슬라이스
    pub fn points(&self) -> &[[i32; 2]; 4] {
        &self.0
    }

    /// 평행 이동 (i32 범위에서 포화)
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        let mut pts = self.0;
        for p in &mut pts {
            p[0] = p[0].saturating_add(dx);
            p[1] = p[1].saturating_add(dy);
        }
        Self(pts)
    }

    /// 바운딩 박스 `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let xs = self.0.iter().map(|p| p[0]);
        let ys = self.0.iter().map(|p| p[1]);
        (
            xs.clone().min().unwrap_or(0),
            ys.clone().min().unwrap_or(0),
            xs.max().unwrap_or(0),
            ys.max().unwrap_or(0),
        )
    }

    /// 축 정렬 박스로 간주한 IoU.
    ///
    /// 0번 꼭짓점을 좌상단, 2번 꼭짓점을 우하단으로 사용한다.
    pub fn box_iou(&self, other: &Polygon) -> f64 {
        let [ax0, ay0] = self.0[0].map(i64::from);
        let [ax1, ay1] = self.0[2].map(i64::from);
        let [bx0, by0] = other.0[0].map(i64::from);
        let [bx1, by1] = other.0[2].map(i64::from);

        let iw = (ax1.min(bx1) - ax0.max(bx0)).max(0);
        let ih = (ay1.min(by1) - ay0.max(by0)).max(0);
        let inter = iw as i128 * ih as i128;
        let area_a = (ax1 - ax0) as i128 * (ay1 - ay0) as i128;
        let area_b = (bx1 - bx0) as i128 * (by1 - by0) as i128;
        let union = area_a + area_b - inter;

        if union > 0 {
            inter as f64 / union as f64
        } else {
            0.0
        }
    }
}
