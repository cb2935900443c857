//! 설정 파일 관리.
//!
//! 기본값 → JSON 설정 파일 → 환경변수 순서로 레이어를 쌓아 설정을 로드한다.
//! 환경변수 형식: `SCREENSIGHT_<SECTION>__<KEY>` (예: `SCREENSIGHT_SERVER__PORT=9000`)

use crate::config::AppConfig;
use crate::error::CoreError;
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 환경변수 접두사
const ENV_PREFIX: &str = "SCREENSIGHT";

/// 설정 관리자
///
/// 시작 시 한 번 로드하며 이후 설정은 불변이다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 병합된 설정
    config: AppConfig,
    /// 설정 파일 경로
    config_path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 기본 경로에서 설정 로드
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::default_config_path()?)
    }

    /// 지정된 경로로 설정 관리자 생성
    ///
    /// 설정 파일이 없으면 기본 설정 파일을 만든다.
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        if !config_path.exists() {
            Self::save_to_file(&config_path, &AppConfig::default_config())?;
            info!("기본 설정 파일 생성: {}", config_path.display());
        }

        let config = Self::load_layers(&config_path)?;
        debug!("설정 로드 완료: {}", config_path.display());

        Ok(Self {
            config,
            config_path,
        })
    }

    /// 현재 설정
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// 설정 파일 경로 반환
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 플랫폼별 기본 설정 파일 경로
    ///
    /// - Linux: `~/.config/screensight/config.json`
    /// - macOS: `~/Library/Application Support/io.screensight.screensight/config.json`
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("io", "screensight", "screensight")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }

    /// 기본값 + 파일 + 환경변수 병합
    fn load_layers(path: &Path) -> Result<AppConfig, CoreError> {
        let defaults = Config::try_from(&AppConfig::default_config())
            .map_err(|e| CoreError::Config(format!("기본 설정 직렬화 실패: {e}")))?;

        Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| {
                CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
            })
    }

    /// 파일에 설정 저장
    fn save_to_file(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_default_file_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let manager = ConfigManager::with_path(config_path.clone()).unwrap();
        assert!(config_path.exists());
        assert_eq!(manager.get().server.port, 8000);
        assert_eq!(manager.config_path(), config_path.as_path());
    }

    #[test]
    fn file_values_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"templates": {"dir": "/srv/icons", "default_threshold": 0.9}}"#,
        )
        .unwrap();

        let manager = ConfigManager::with_path(config_path).unwrap();
        let config = manager.get();
        assert_eq!(config.templates.dir, PathBuf::from("/srv/icons"));
        assert!((config.templates.default_threshold - 0.9).abs() < f64::EPSILON);
        // 파일에 없는 섹션은 기본값
        assert_eq!(config.capture.adb_path, "adb");
    }

    #[test]
    fn environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"workers": {"threads": 2}}"#).unwrap();

        std::env::set_var("SCREENSIGHT_WORKERS__THREADS", "7");
        let manager = ConfigManager::with_path(config_path);
        std::env::remove_var("SCREENSIGHT_WORKERS__THREADS");

        assert_eq!(manager.unwrap().get().workers.threads, Some(7));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = ConfigManager::with_path(config_path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
