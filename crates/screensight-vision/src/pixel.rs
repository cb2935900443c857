//! 픽셀 배열 유틸리티.
//!
//! 그레이스케일 변환, Otsu 전역 이진화, 다각형 마스크, 타원 팽창 링 샘플링.
//! 모든 그레이스케일 변환은 BT.601 가중치(14비트 고정소수점)를 사용한다.

use image::{GrayImage, RgbImage};
use screensight_core::models::frame::{Frame, Rect};
use screensight_core::models::geometry::Polygon;

/// 팽창 구조 요소 반지름 (7x7 타원)
pub const DILATE_RADIUS: i32 = 3;

/// 7x7 타원 구조 요소의 행별 가로 반폭 (dy = -3..=3)
const ELLIPSE_SPANS: [i32; 7] = [0, 2, 3, 3, 3, 2, 0];

/// RGB → 8비트 휘도
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    ((u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868 + (1 << 13)) >> 14) as u8
}

/// RGB 이미지 → 그레이스케일
pub fn to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([luma(image.get_pixel(x, y).0)])
    })
}

/// 프레임에서 사각형 잘라내기
pub fn crop(frame: &Frame, rect: Rect) -> RgbImage {
    image::imageops::crop_imm(frame.image(), rect.x, rect.y, rect.w, rect.h).to_image()
}

/// Otsu 임계값: 클래스 간 분산을 최대화하는 밝기.
///
/// 이진화는 `gray > threshold`를 전경으로 본다. 모든 분할의 분산이 0이면 0을 반환한다.
pub fn otsu_threshold<I>(gray: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let mut hist = [0u64; 256];
    let mut total = 0u64;
    for g in gray {
        hist[g as usize] += 1;
        total += 1;
    }
    if total == 0 {
        return 0;
    }

    let scale = 1.0 / total as f64;
    let mu: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum::<f64>()
        * scale;

    let mut q1 = 0.0f64;
    let mut mu1 = 0.0f64;
    let mut max_sigma = 0.0f64;
    let mut max_val = 0u8;

    for (i, &n) in hist.iter().enumerate() {
        let p_i = n as f64 * scale;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;

        if q1.min(q2) < f64::from(f32::EPSILON) || q1.max(q2) > 1.0 - f64::from(f32::EPSILON) {
            continue;
        }

        mu1 = (mu1 + i as f64 * p_i) / q1;
        let mu2 = (mu - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            max_val = i as u8;
        }
    }

    max_val
}

/// Otsu 이진화로 분리한 전경(글자) 픽셀의 평균 색. 전경이 없으면 검정.
pub fn foreground_mean(patch: &RgbImage) -> [u8; 3] {
    let threshold = otsu_threshold(patch.pixels().map(|p| luma(p.0)));
    mean_rgb(
        patch
            .pixels()
            .map(|p| p.0)
            .filter(|&rgb| luma(rgb) > threshold),
    )
}

/// 픽셀 평균 색 (채널별 버림). 빈 입력은 검정.
pub fn mean_rgb<I>(pixels: I) -> [u8; 3]
where
    I: IntoIterator<Item = [u8; 3]>,
{
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for [r, g, b] in pixels {
        sum[0] += u64::from(r);
        sum[1] += u64::from(g);
        sum[2] += u64::from(b);
        count += 1;
    }
    if count == 0 {
        return [0, 0, 0];
    }
    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

/// 프레임 경계로 잘린 다각형 채움 마스크.
///
/// 다각형 바운딩 박스를 팽창 반지름만큼 넓힌 창(window)만 저장한다.
/// 경계선 위의 격자점은 내부로 본다.
#[derive(Debug, Clone)]
pub struct PolygonMask {
    x0: i32,
    y0: i32,
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl PolygonMask {
    /// 프레임 `frame_w x frame_h` 위에 다각형 채우기
    pub fn fill(polygon: &Polygon, frame_w: u32, frame_h: u32) -> Self {
        let (min_x, min_y, max_x, max_y) = polygon.bounds();
        let fw = i32::try_from(frame_w).unwrap_or(i32::MAX);
        let fh = i32::try_from(frame_h).unwrap_or(i32::MAX);

        // 창은 프레임 안으로 잘리므로 폭/높이는 프레임 크기를 넘지 않는다
        let x0 = min_x.saturating_sub(DILATE_RADIUS).clamp(0, fw);
        let y0 = min_y.saturating_sub(DILATE_RADIUS).clamp(0, fh);
        let x1 = max_x.saturating_add(DILATE_RADIUS).min(fw - 1);
        let y1 = max_y.saturating_add(DILATE_RADIUS).min(fh - 1);
        let width = (x1 - x0 + 1).max(0);
        let height = (y1 - y0 + 1).max(0);

        let mut bits = vec![false; width as usize * height as usize];
        for y in 0..height {
            for x in 0..width {
                bits[y as usize * width as usize + x as usize] =
                    contains_point(polygon, x0 + x, y0 + y);
            }
        }

        Self {
            x0,
            y0,
            width,
            height,
            bits,
        }
    }

    /// 프레임 좌표 (x, y)가 다각형 내부인지
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.width || ly >= self.height {
            return false;
        }
        self.bits[ly as usize * self.width as usize + lx as usize]
    }

    /// 마스크 내부 픽셀 수
    pub fn area(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// 타원 팽창 후 원래 마스크를 뺀 링 좌표 (행 우선 순서)
    pub fn ring(&self) -> Vec<(u32, u32)> {
        let mut ring = Vec::new();
        for ly in 0..self.height {
            for lx in 0..self.width {
                let (x, y) = (self.x0 + lx, self.y0 + ly);
                if !self.get(x, y) && self.dilated(x, y) {
                    ring.push((x as u32, y as u32));
                }
            }
        }
        ring
    }

    fn dilated(&self, x: i32, y: i32) -> bool {
        ELLIPSE_SPANS.iter().enumerate().any(|(row, &span)| {
            let dy = row as i32 - DILATE_RADIUS;
            (-span..=span).any(|dx| self.get(x + dx, y + dy))
        })
    }
}

/// 다각형 바깥 링의 픽셀 색 (행 우선 순서)
pub fn ring_pixels(frame: &Frame, polygon: &Polygon) -> Vec<[u8; 3]> {
    PolygonMask::fill(polygon, frame.width(), frame.height())
        .ring()
        .into_iter()
        .map(|(x, y)| frame.rgb(x, y))
        .collect()
}

/// 격자점 포함 판정 (경계 포함)
fn contains_point(polygon: &Polygon, px: i32, py: i32) -> bool {
    let pts = polygon.points();
    let n = pts.len();

    for i in 0..n {
        let [ax, ay] = pts[i];
        let [bx, by] = pts[(i + 1) % n];
        let cross = (i128::from(bx) - i128::from(ax)) * (i128::from(py) - i128::from(ay))
            - (i128::from(by) - i128::from(ay)) * (i128::from(px) - i128::from(ax));
        if cross == 0
            && px >= ax.min(bx)
            && px <= ax.max(bx)
            && py >= ay.min(by)
            && py <= ay.max(by)
        {
            return true;
        }
    }

    let mut inside = false;
    for i in 0..n {
        let [ax, ay] = pts[i];
        let [bx, by] = pts[(i + 1) % n];
        if (ay > py) != (by > py) {
            let x_cross = f64::from(ax)
                + (f64::from(py) - f64::from(ay)) * (f64::from(bx) - f64::from(ax))
                    / (f64::from(by) - f64::from(ay));
            if f64::from(px) < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}
