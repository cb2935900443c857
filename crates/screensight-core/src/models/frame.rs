//! 캡처 프레임과 분석 영역 모델.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 디코딩된 캡처 프레임 (R, G, B 3채널)
///
/// 너비/높이는 항상 0보다 크고 버퍼 길이는 `w * h * 3`이다.
/// 분석 호출 하나가 소유하며 분석이 끝나면 폐기된다.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// RGB 버퍼에서 프레임 생성
    pub fn new(image: RgbImage) -> Result<Self, CoreError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CoreError::Protocol(format!(
                "빈 프레임: {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    /// 원시 RGB 바이트에서 프레임 생성
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let image = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            CoreError::Protocol(format!("RGB 버퍼 길이 불일치: {width}x{height}"))
        })?;
        Self::new(image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 픽셀 버퍼 참조
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// (x, y) 픽셀 RGB 값
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// 프레임 전체 영역
    pub fn full_region(&self) -> Region {
        Region::full(self.width(), self.height())
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// 클램프된 사각형 영역 (픽셀 단위, 우하단 배타)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// 호출자가 지정한 분석 영역 `(x0, y0)`–`(x1, y1)`
///
/// 프레임 밖 좌표도 허용하며, 분석 시점에 프레임 경계로 클램프한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Region {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// `width x height` 프레임 전체
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_dim(width), clamp_dim(height))
    }

    /// 프레임 경계로 클램프. 면적이 0이면 `None`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rect> {
        let w = i64::from(width);
        let h = i64::from(height);
        let x0 = i64::from(self.x0).clamp(0, w);
        let x1 = i64::from(self.x1).clamp(0, w);
        let y0 = i64::from(self.y0).clamp(0, h);
        let y1 = i64::from(self.y1).clamp(0, h);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Rect {
            x: x0 as u32,
            y: y0 as u32,
            w: (x1 - x0) as u32,
            h: (y1 - y0) as u32,
        })
    }
}

fn clamp_dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
