//! 디버그 스냅샷.
//!
//! 디버그 모드에서 분석에 사용한 프레임을 PNG로 남긴다.
//! 데이터 계약 밖의 부수 경로이므로 저장 실패는 호출자에게 전파하지 않는다.

use chrono::{DateTime, Utc};
use screensight_core::config::DebugConfig;
use screensight_core::error::CoreError;
use screensight_core::models::frame::Frame;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 스냅샷 저장기
#[derive(Debug, Clone)]
pub struct DebugSnapshots {
    output_dir: PathBuf,
    enabled: bool,
}

impl DebugSnapshots {
    pub fn new(output_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            enabled,
        }
    }

    /// 설정 기준 생성 (플래그 또는 마커 파일)
    pub fn from_config(config: &DebugConfig) -> Self {
        let enabled = config.is_active();
        if enabled {
            debug!("디버그 스냅샷 활성화: {}", config.output_dir.display());
        }
        Self::new(config.output_dir.clone(), enabled)
    }

    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 호출자 이름 또는 `debug_<unix초>.png`
    pub fn file_name(debug_name: Option<&str>, now: DateTime<Utc>) -> String {
        debug_name
            .and_then(sanitize)
            .map(with_png_extension)
            .unwrap_or_else(|| format!("debug_{}.png", now.timestamp()))
    }

    /// 프레임을 PNG로 저장 (블로킹)
    pub fn save(&self, frame: &Frame, file_name: &str) -> Result<PathBuf, CoreError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        frame
            .image()
            .save_with_format(&path, image::ImageFormat::Png)?;
        debug!("디버그 스냅샷 저장: {}", path.display());
        Ok(path)
    }

    /// 저장하되 실패는 경고만 남긴다 (블로킹)
    pub fn save_quietly(&self, frame: &Frame, file_name: &str) -> Option<PathBuf> {
        match self.save(frame, file_name) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("디버그 스냅샷 저장 실패: {file_name}: {e}");
                None
            }
        }
    }
}

/// 디렉토리 성분 제거
fn sanitize(name: &str) -> Option<&str> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
}

fn with_png_extension(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.png")
    }
}
