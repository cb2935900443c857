//! # screensight-app
//!
//! screensight 서버 바이너리 진입점.
//! 설정 로드, 의존성 조립, HTTP 서버 실행, 종료 처리.

mod lifecycle;
mod wiring;

use anyhow::{Context, Result};
use clap::Parser;
use screensight_core::config::AppConfig;
use screensight_core::config_manager::ConfigManager;
use screensight_web::WebServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;

/// 원격 장치 화면 분석 서버
///
/// adb로 화면을 캡처해 텍스트 영역, 템플릿 위치, 텍스트 출현을 HTTP로 제공한다.
#[derive(Parser, Debug)]
#[command(name = "screensight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 서버 포트 (설정 파일 값보다 우선)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 템플릿 PNG 디렉토리
    #[arg(long, short = 't')]
    templates: Option<PathBuf>,

    /// 디버그 스냅샷 저장 활성화
    #[arg(long, short = 'd')]
    debug: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

impl Args {
    /// CLI 인자로 설정 오버라이드
    fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref dir) = self.templates {
            config.templates.dir = dir.clone();
        }
        if self.debug {
            config.debug.enabled = true;
        }
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match args.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;
    info!("설정 파일: {}", manager.config_path().display());

    let mut config = manager.get().clone();
    args.apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "screensight={level},screensight_app={level},screensight_core={level},screensight_vision={level},screensight_web={level},tower_http={level}",
        level = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("screensight 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let service = Arc::new(wiring::build_service(&config)?);

    let lifecycle = LifecycleManager::new();
    let server = WebServer::new(service.clone(), config.server.clone());
    let mut server_task = tokio::spawn(server.run(lifecycle.subscribe()));

    // 서버가 시그널보다 먼저 끝나면 바인드 실패 같은 비정상 종료
    let finished = tokio::select! {
        _ = lifecycle.wait_for_signal() => None,
        result = &mut server_task => Some(result),
    };
    let result = match finished {
        Some(result) => result,
        None => {
            info!("종료 중... 진행 중인 요청 대기");
            server_task.await
        }
    };

    service.shutdown();
    match result {
        Ok(Ok(())) => {
            info!("screensight 종료");
            Ok(())
        }
        Ok(Err(e)) => Err(e).context("HTTP 서버 실행 실패"),
        Err(e) => Err(e).context("HTTP 서버 태스크 실패"),
    }
}
