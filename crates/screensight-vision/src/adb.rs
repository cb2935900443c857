//! adb 캡처 어댑터.
//!
//! `adb [-s <device>] exec-out screencap` 원시 출력을 그대로 반환한다.
//! 중간 파일 없이 표준 출력으로 받으며 해석은 `FrameDecoder`가 한다.

use async_trait::async_trait;
use screensight_core::error::CoreError;
use screensight_core::ports::screen_source::ScreenSource;
use tokio::process::Command;
use tracing::debug;

/// adb 기반 [`ScreenSource`]
#[derive(Debug, Clone)]
pub struct AdbScreenSource {
    adb_path: String,
}

impl AdbScreenSource {
    pub fn new(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    /// 실행할 인자 목록
    pub fn args(device_id: Option<&str>) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if let Some(id) = device_id {
            args.push("-s".to_string());
            args.push(id.to_string());
        }
        args.push("exec-out".to_string());
        args.push("screencap".to_string());
        args
    }
}

impl Default for AdbScreenSource {
    fn default() -> Self {
        Self::new("adb")
    }
}

#[async_trait]
impl ScreenSource for AdbScreenSource {
    async fn capture(&self, device_id: Option<&str>) -> Result<Vec<u8>, CoreError> {
        let args = Self::args(device_id);
        debug!(adb = %self.adb_path, ?args, "adb 캡처 실행");

        let output = Command::new(&self.adb_path)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CoreError::Capture(format!("{} 실행 실패: {e}", self.adb_path)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Capture(format!(
                "screencap 실패 ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    fn name(&self) -> &str {
        "adb"
    }
}
