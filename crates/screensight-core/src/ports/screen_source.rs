//! 화면 캡처 포트.
//!
//! 원격 장치에서 원시 캡처 바이트를 가져오는 외부 협력자.
//! 구현: `screensight-vision`의 `AdbScreenSource`

use async_trait::async_trait;

use crate::error::CoreError;

/// 원시 캡처 스트림 제공자
///
/// 반환 바이트는 12바이트 리틀엔디언 헤더 `(width, height, format)` 뒤에
/// `width * height * 4` 바이트 RGBA 픽셀이 이어진다. 해석은 `FrameDecoder`가 한다.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    /// 장치 식별자(선택)로 캡처 1회 수행
    async fn capture(&self, device_id: Option<&str>) -> Result<Vec<u8>, CoreError>;

    /// 제공자 이름 (예: "adb")
    fn name(&self) -> &str;
}
