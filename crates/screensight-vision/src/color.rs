//! 픽셀 색상 분류.
//!
//! RGB → HSV 변환 후 고정 규칙으로 7가지 [`ColorBucket`] 중 하나를 고른다.
//! HSV 스케일은 8비트 관례를 따른다: H 0..180 (도/2), S/V 0..255.
//!
//! 판정 순서 (먼저 맞는 규칙 적용):
//! 1. 저채도 + 고명도 → white
//! 2. 저채도 + 저명도 → black
//! 3. 중채도 미만 → gray
//! 4. 색상각: red(0 근처 순환) → yellow → green → blue
//! 5. 나머지 색상각 → gray

use screensight_core::models::zone::ColorBucket;

/// 무채색 판정 채도 상한
const SAT_LOW: u8 = 35;
/// 이 채도 미만은 색조가 있어도 gray
const SAT_MID: u8 = 60;
/// white 판정 명도 하한 (초과)
const VAL_HIGH: u8 = 220;
/// black 판정 명도 상한 (미만)
const VAL_LOW: u8 = 70;

/// red: `h < RED_LOW || h >= RED_HIGH`
const RED_LOW: u8 = 10;
const RED_HIGH: u8 = 170;
/// yellow: `RED_LOW <= h < YELLOW_END`
const YELLOW_END: u8 = 35;
/// green: `YELLOW_END <= h < GREEN_END`
const GREEN_END: u8 = 85;
/// blue: `GREEN_END <= h < BLUE_END`
const BLUE_END: u8 = 140;

/// 8비트 HSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// 색상각 / 2 (0..180)
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    /// RGB → HSV
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
        let v = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let diff = v - min;

        let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

        let mut h = if diff == 0.0 {
            0.0
        } else if v == rf {
            60.0 * (gf - bf) / diff
        } else if v == gf {
            120.0 + 60.0 * (bf - rf) / diff
        } else {
            240.0 + 60.0 * (rf - gf) / diff
        };
        if h < 0.0 {
            h += 360.0;
        }

        // 180은 0과 같은 색상각
        let h = ((h / 2.0).round() as u16 % 180) as u8;

        Self {
            h,
            s: s.round().min(255.0) as u8,
            v: v as u8,
        }
    }
}

/// 색상 분류기
///
/// 임계값은 상수이며 호출마다 바뀌지 않는다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorClassifier;

impl ColorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 픽셀 1개 분류 (전함수: 항상 버킷 하나를 반환)
    pub fn classify(&self, rgb: [u8; 3]) -> ColorBucket {
        let Hsv { h, s, v } = Hsv::from_rgb(rgb);

        if s < SAT_LOW && v > VAL_HIGH {
            return ColorBucket::White;
        }
        if s < SAT_LOW && v < VAL_LOW {
            return ColorBucket::Black;
        }
        if s < SAT_MID {
            return ColorBucket::Gray;
        }

        if !(RED_LOW..RED_HIGH).contains(&h) {
            ColorBucket::Red
        } else if h < YELLOW_END {
            ColorBucket::Yellow
        } else if h < GREEN_END {
            ColorBucket::Green
        } else if h < BLUE_END {
            ColorBucket::Blue
        } else {
            ColorBucket::Gray
        }
    }

    /// 픽셀 집합의 최빈 버킷 (동률이면 먼저 나온 버킷, 빈 입력은 gray)
    pub fn classify_majority<I>(&self, pixels: I) -> ColorBucket
    where
        I: IntoIterator<Item = [u8; 3]>,
    {
        // 첫 등장 순서를 유지하는 카운터
        let mut counts: Vec<(ColorBucket, usize)> = Vec::with_capacity(ColorBucket::ALL.len());
        for px in pixels {
            let bucket = self.classify(px);
            match counts.iter_mut().find(|(b, _)| *b == bucket) {
                Some((_, n)) => *n += 1,
                None => counts.push((bucket, 1)),
            }
        }

        let mut best: Option<(ColorBucket, usize)> = None;
        for (bucket, n) in counts {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((bucket, n));
            }
        }
        best.map(|(b, _)| b).unwrap_or(ColorBucket::Gray)
    }
}
