//! 의존성 조립.
//!
//! `AppConfig`에서 어댑터(adb 캡처, 로컬 인식기, 템플릿 저장소, 시계, 워커 풀)를
//! 만들어 [`VisionService`]로 묶는다.

use anyhow::{Context, Result};
use screensight_core::config::AppConfig;
use screensight_core::ports::clock::TokioClock;
use screensight_vision::adb::AdbScreenSource;
use screensight_vision::engine::RecognitionEngine;
use screensight_vision::local_recognizer::LocalRecognizerFactory;
use screensight_vision::pool::WorkerPool;
use screensight_vision::service::{ServiceOptions, VisionService};
use screensight_vision::templates::TemplateStore;
use std::sync::Arc;
use tracing::info;

/// 설정으로 화면 분석 서비스 생성
pub fn build_service(config: &AppConfig) -> Result<VisionService> {
    let source = Arc::new(AdbScreenSource::new(config.capture.adb_path.clone()));

    let factory = Arc::new(LocalRecognizerFactory::from_config(&config.recognition));
    let engine = RecognitionEngine::new(factory).context("텍스트 인식기 초기화 실패")?;

    let templates = TemplateStore::load_dir(&config.templates.dir).with_context(|| {
        format!("템플릿 로드 실패: {}", config.templates.dir.display())
    })?;

    let threads = config.workers.resolved_threads();
    let options = ServiceOptions::from_config(config);

    info!(
        adb = %config.capture.adb_path,
        recognizer = %engine.recognizer_name(),
        templates = templates.len(),
        workers = threads,
        cache_ttl_ms = config.capture.cache_ttl_ms,
        debug = options.snapshots.is_enabled(),
        "서비스 구성 완료"
    );

    Ok(VisionService::new(
        source,
        Arc::new(engine),
        templates,
        Arc::new(TokioClock),
        WorkerPool::new(threads),
        options,
    ))
}
