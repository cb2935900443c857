//! 캡처 스트림 디코더.
//!
//! `screencap` 원시 출력 형식:
//! `<width:u32 LE><height:u32 LE><format:u32 LE>` 12바이트 헤더 뒤에
//! `width * height * 4` 바이트 RGBA 픽셀. 포맷 코드는 `1`(RGBA_8888)만 지원한다.
//! 알파 채널은 버리고 R, G, B 3채널 [`Frame`]을 만든다.

use screensight_core::error::CoreError;
use screensight_core::models::frame::Frame;
use tracing::debug;

/// 헤더 길이 (바이트)
pub const HEADER_LEN: usize = 12;

/// 지원 포맷 코드: RGBA_8888
pub const FORMAT_RGBA_8888: u32 = 1;

/// 입력 픽셀당 바이트 수
const INPUT_CHANNELS: usize = 4;

/// 캡처 헤더
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub width: u32,
    pub height: u32,
    pub format: u32,
}

impl CaptureHeader {
    /// 헤더 파싱 (길이만 검사, 포맷은 검사하지 않음)
    pub fn parse(raw: &[u8]) -> Result<Self, CoreError> {
        if raw.len() < HEADER_LEN {
            return Err(CoreError::Protocol(format!(
                "헤더 길이 부족: {}바이트 < {HEADER_LEN}",
                raw.len()
            )));
        }
        Ok(Self {
            width: read_u32_le(raw, 0),
            height: read_u32_le(raw, 4),
            format: read_u32_le(raw, 8),
        })
    }

    /// 헤더가 선언한 픽셀 페이로드 길이
    pub fn payload_len(&self) -> Result<usize, CoreError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(INPUT_CHANNELS))
            .ok_or_else(|| {
                CoreError::Protocol(format!(
                    "페이로드 크기 오버플로우: {}x{}",
                    self.width, self.height
                ))
            })
    }
}

#[inline]
fn read_u32_le(raw: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        raw[offset],
        raw[offset + 1],
        raw[offset + 2],
        raw[offset + 3],
    ])
}

/// 캡처 바이트 → [`Frame`] 디코더
///
/// 바이트를 어떻게 얻었는지는 알지 못한다.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    pub fn new() -> Self {
        Self
    }

    /// 원시 캡처 디코딩
    ///
    /// 선언 길이를 넘는 꼬리 바이트는 무시한다.
    pub fn decode(&self, raw: &[u8]) -> Result<Frame, CoreError> {
        let header = CaptureHeader::parse(raw)?;
        if header.format != FORMAT_RGBA_8888 {
            return Err(CoreError::Protocol(format!(
                "미지원 포맷 코드: {}",
                header.format
            )));
        }

        let expected = header.payload_len()?;
        let body = &raw[HEADER_LEN..];
        if body.len() < expected {
            return Err(CoreError::Protocol(format!(
                "캡처 데이터 잘림: {} / {expected}바이트",
                body.len()
            )));
        }

        let rgb: Vec<u8> = body[..expected]
            .chunks_exact(INPUT_CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        debug!("캡처 디코딩 완료: {}x{}", header.width, header.height);
        Frame::from_rgb(header.width, header.height, rgb)
    }
}
