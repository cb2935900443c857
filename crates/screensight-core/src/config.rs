//! 애플리케이션 설정 구조체.
//!
//! 서버 포트, 캡처 명령, 인식 엔진, 템플릿 경로, 디버그 스냅샷, 워커 풀 크기 등
//! 런타임 설정을 정의한다. `config` crate를 통해 파일/환경변수에서 로드.
//!
//! 색상 임계값, 최대 재시도 횟수, NMS IoU 임계값은 설정이 아닌 상수다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 캡처 설정
    #[serde(default)]
    pub capture: CaptureConfig,
    /// 텍스트 인식 설정
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// 템플릿 매칭 설정
    #[serde(default)]
    pub templates: TemplateConfig,
    /// 디버그 스냅샷 설정
    #[serde(default)]
    pub debug: DebugConfig,
    /// 워커 풀 설정
    #[serde(default)]
    pub workers: WorkerConfig,
}

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }
}

// ============================================================
// 서버 설정
// ============================================================

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 바인드 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 외부 접근 허용 (true: 0.0.0.0, false: 127.0.0.1)
    #[serde(default = "default_true")]
    pub allow_external: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allow_external: true,
        }
    }
}

// ============================================================
// 캡처 설정
// ============================================================

/// 캡처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// adb 실행 파일 경로
    #[serde(default = "default_adb_path")]
    pub adb_path: String,
    /// 같은 장치 프레임 재사용 시간 (밀리초, 0이면 캐시 비활성)
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// 요청에 장치 ID가 없을 때 사용할 장치
    #[serde(default)]
    pub default_device: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            cache_ttl_ms: default_cache_ttl_ms(),
            default_device: None,
        }
    }
}

impl CaptureConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

// ============================================================
// 인식 설정
// ============================================================

/// 텍스트 인식 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// 인식 언어
    #[serde(default = "default_language")]
    pub language: String,
    /// Tesseract 데이터 경로 (None이면 시스템 기본값)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,
    /// 일시 오류 재시도 전 추가 대기 (밀리초)
    #[serde(default)]
    pub retry_backoff_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tessdata_path: None,
            retry_backoff_ms: 0,
        }
    }
}

impl RecognitionConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// ============================================================
// 템플릿 설정
// ============================================================

/// 템플릿 매칭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// 템플릿 PNG 디렉토리
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,
    /// 요청에 임계값이 없을 때의 유사도 임계값
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            default_threshold: default_threshold(),
        }
    }
}

// ============================================================
// 디버그 설정
// ============================================================

/// 디버그 스냅샷 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 스냅샷 저장 활성화
    #[serde(default)]
    pub enabled: bool,
    /// 이 파일이 존재하면 `enabled`와 무관하게 활성화
    #[serde(default = "default_marker_file")]
    pub marker_file: PathBuf,
    /// 스냅샷 저장 디렉토리
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            marker_file: default_marker_file(),
            output_dir: default_output_dir(),
        }
    }
}

impl DebugConfig {
    /// 플래그 또는 마커 파일로 활성화 여부 판단
    pub fn is_active(&self) -> bool {
        self.enabled || self.marker_file.exists()
    }
}

// ============================================================
// 워커 설정
// ============================================================

/// 블로킹 작업 워커 풀 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// 동시 실행 작업 수 (None이면 CPU 코어 수)
    #[serde(default)]
    pub threads: Option<usize>,
}

impl WorkerConfig {
    pub fn resolved_threads(&self) -> usize {
        self.threads.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8000
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    100
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("references").join("icons")
}

fn default_threshold() -> f64 {
    0.8
}

fn default_marker_file() -> PathBuf {
    PathBuf::from("/DEBUG")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}
