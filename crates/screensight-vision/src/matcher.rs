//! 템플릿 매칭.
//!
//! 영역마다 정규화 상호상관(평균 제거, TM_CCOEFF_NORMED)으로 후보 위치를 찾고,
//! 전체 후보를 발견 순서 그대로 비최대 억제(NMS)로 중복 제거한다.
//!
//! 후보는 점수로 정렬하지 않는다. 영역 순서 → 행 → 열 순서로 먼저 발견된
//! 후보가 살아남는다.

use image::GrayImage;
use screensight_core::error::CoreError;
use screensight_core::models::frame::{Frame, Rect, Region};
use screensight_core::models::matching::Match;
use tracing::debug;

use crate::pixel;
use crate::templates::TemplateStore;

/// 중복 판정 IoU 임계값 (초과하면 억제)
pub const NMS_IOU_THRESHOLD: f64 = 0.5;

/// 템플릿 매처
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchFinder;

impl MatchFinder {
    pub fn new() -> Self {
        Self
    }

    /// 이름으로 템플릿을 찾아 매칭
    pub fn find_by_name(
        &self,
        frame: &Frame,
        store: &TemplateStore,
        name: &str,
        regions: Option<&[Region]>,
        threshold: f64,
    ) -> Result<Vec<Match>, CoreError> {
        let template = store.get(name)?;
        Ok(self.find(frame, &template, regions, threshold))
    }

    /// 프레임(또는 지정 영역들)에서 임계값 이상 매치 찾기
    ///
    /// 영역이 없으면 프레임 전체를 검색한다. 영역은 프레임 경계로 잘리며,
    /// 템플릿보다 작은 영역은 후보를 내지 않는다.
    pub fn find(
        &self,
        frame: &Frame,
        template: &GrayImage,
        regions: Option<&[Region]>,
        threshold: f64,
    ) -> Vec<Match> {
        let gray = pixel::to_gray(frame.image());
        let full = [frame.full_region()];
        let regions = regions.filter(|r| !r.is_empty()).unwrap_or(&full[..]);

        let mut candidates = Vec::new();
        for region in regions {
            if let Some(rect) = region.clamp_to(frame.width(), frame.height()) {
                scan(&gray, rect, template, threshold, &mut candidates);
            }
        }

        let kept = suppress_overlaps(candidates, NMS_IOU_THRESHOLD);
        debug!(matches = kept.len(), threshold, "템플릿 매칭 완료");
        kept
    }
}

/// 발견 순서 유지 탐욕 NMS
///
/// 이미 남긴 모든 후보와의 IoU가 `iou_threshold` 이하인 후보만 남긴다.
pub fn suppress_overlaps(candidates: Vec<Match>, iou_threshold: f64) -> Vec<Match> {
    let mut kept: Vec<Match> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| candidate.iou(k) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}

/// 영역 안 모든 좌상단 오프셋의 점수 계산, 임계값 이상은 행 우선으로 `out`에 추가
fn scan(gray: &GrayImage, rect: Rect, template: &GrayImage, threshold: f64, out: &mut Vec<Match>) {
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > rect.w || th > rect.h {
        return;
    }

    let prepared = PreparedTemplate::new(template);
    let integral = Integral::new(gray, rect);
    let n = f64::from(tw * th);

    for oy in 0..=(rect.h - th) {
        for ox in 0..=(rect.w - tw) {
            let (sum, sq_sum) = integral.window(ox, oy, tw, th);
            let window_var = (sq_sum - sum * sum / n).max(0.0);
            let numerator = prepared.correlate(gray, rect.x + ox, rect.y + oy);
            let score = normalize(numerator, window_var.sqrt() * prepared.norm);

            if score >= threshold {
                out.push(Match::at(
                    (rect.x + ox) as i32,
                    (rect.y + oy) as i32,
                    tw as i32,
                    th as i32,
                ));
            }
        }
    }
}

/// 상관값 정규화: 분모가 0(평탄한 창 또는 템플릿)이면 0
fn normalize(numerator: f64, denominator: f64) -> f64 {
    if numerator.abs() < denominator {
        numerator / denominator
    } else if numerator.abs() < denominator * 1.125 {
        numerator.signum()
    } else {
        0.0
    }
}

/// 평균을 뺀 템플릿
struct PreparedTemplate {
    width: u32,
    height: u32,
    centered: Vec<f64>,
    norm: f64,
}

impl PreparedTemplate {
    fn new(template: &GrayImage) -> Self {
        let (width, height) = template.dimensions();
        let count = f64::from(width * height);
        let mean = template.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / count;
        let centered: Vec<f64> = template.pixels().map(|p| f64::from(p.0[0]) - mean).collect();
        let norm = centered.iter().map(|v| v * v).sum::<f64>().sqrt();
        Self {
            width,
            height,
            centered,
            norm,
        }
    }

    /// Σ T'(i,j)·I(x+i, y+j): T'의 합이 0이므로 창 평균을 빼지 않아도 같다
    fn correlate(&self, gray: &GrayImage, x: u32, y: u32) -> f64 {
        let stride = gray.width() as usize;
        let raw = gray.as_raw();
        let w = self.width as usize;

        let mut acc = 0.0;
        for row in 0..self.height as usize {
            let start = (y as usize + row) * stride + x as usize;
            let line = &raw[start..start + w];
            let t_line = &self.centered[row * w..(row + 1) * w];
            acc += line
                .iter()
                .zip(t_line)
                .map(|(&i, &t)| f64::from(i) * t)
                .sum::<f64>();
        }
        acc
    }
}

/// 영역 내 합 / 제곱합 적분 영상
struct Integral {
    stride: usize,
    sum: Vec<f64>,
    sq_sum: Vec<f64>,
}

impl Integral {
    fn new(gray: &GrayImage, rect: Rect) -> Self {
        let stride = rect.w as usize + 1;
        let rows = rect.h as usize + 1;
        let mut sum = vec![0.0; stride * rows];
        let mut sq_sum = vec![0.0; stride * rows];

        for y in 0..rect.h as usize {
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..rect.w as usize {
                let v = f64::from(gray.get_pixel(rect.x + x as u32, rect.y + y as u32).0[0]);
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sq_sum[idx] = sq_sum[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sq_sum,
        }
    }

    /// 영역 좌표 (x, y)에서 시작하는 w x h 창의 (합, 제곱합)
    fn window(&self, x: u32, y: u32, w: u32, h: u32) -> (f64, f64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |table: &[f64], x: usize, y: usize| table[y * self.stride + x];
        let rect_sum = |table: &[f64]| {
            at(table, x1, y1) - at(table, x0, y1) - at(table, x1, y0) + at(table, x0, y0)
        };
        (rect_sum(&self.sum), rect_sum(&self.sq_sum))
    }
}
