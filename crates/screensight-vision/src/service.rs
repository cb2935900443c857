//! 화면 분석 서비스 파사드.
//!
//! 외부 요청 레이어가 호출하는 세 가지 작업을 묶는다.
//! - [`VisionService::ocr`]: 단발 영역 분석 (빈 영역은 배경 요약 존)
//! - [`VisionService::find_image`]: 단발 템플릿 검색
//! - [`VisionService::wait_for_text`]: 정지 단어가 보일 때까지 폴링
//!
//! 모든 CPU/블로킹 작업은 워커 풀에서 실행한다.

use chrono::Utc;
use screensight_core::config::AppConfig;
use screensight_core::error::CoreError;
use screensight_core::models::frame::{Frame, Region};
use screensight_core::models::matching::FindResult;
use screensight_core::models::request::{non_empty_regions, FindRequest, OcrRequest, WaitRequest};
use screensight_core::models::zone::Zone;
use screensight_core::ports::clock::Clock;
use screensight_core::ports::screen_source::ScreenSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::analyzer::{EmptyRegion, RegionAnalyzer};
use crate::capture::FrameGrabber;
use crate::debug::DebugSnapshots;
use crate::engine::RecognitionEngine;
use crate::matcher::MatchFinder;
use crate::poller::{ConditionPoller, PollSpec};
use crate::pool::WorkerPool;
use crate::templates::TemplateStore;

/// 서비스 동작 옵션
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub cache_ttl: Duration,
    pub default_device: Option<String>,
    pub retry_backoff: Duration,
    pub default_threshold: f64,
    pub snapshots: DebugSnapshots,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_millis(100),
            default_device: None,
            retry_backoff: Duration::ZERO,
            default_threshold: 0.8,
            snapshots: DebugSnapshots::disabled(),
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cache_ttl: config.capture.cache_ttl(),
            default_device: config.capture.default_device.clone(),
            retry_backoff: config.recognition.retry_backoff(),
            default_threshold: config.templates.default_threshold,
            snapshots: DebugSnapshots::from_config(&config.debug),
        }
    }
}

/// 화면 분석 서비스
pub struct VisionService {
    grabber: Arc<FrameGrabber>,
    analyzer: Arc<RegionAnalyzer>,
    poller: ConditionPoller,
    finder: MatchFinder,
    templates: Arc<TemplateStore>,
    pool: WorkerPool,
    snapshots: DebugSnapshots,
    default_threshold: f64,
}

impl VisionService {
    pub fn new(
        source: Arc<dyn ScreenSource>,
        engine: Arc<RecognitionEngine>,
        templates: TemplateStore,
        clock: Arc<dyn Clock>,
        pool: WorkerPool,
        options: ServiceOptions,
    ) -> Self {
        let grabber = Arc::new(
            FrameGrabber::new(source, clock.clone(), pool.clone(), options.cache_ttl)
                .with_default_device(options.default_device),
        );
        let analyzer =
            Arc::new(RegionAnalyzer::new(engine).with_retry_backoff(options.retry_backoff));
        let poller = ConditionPoller::new(grabber.clone(), analyzer.clone(), pool.clone(), clock);

        Self {
            grabber,
            analyzer,
            poller,
            finder: MatchFinder::new(),
            templates: Arc::new(templates),
            pool,
            snapshots: options.snapshots,
            default_threshold: options.default_threshold,
        }
    }

    /// 단발 영역 분석
    ///
    /// 영역이 없으면 프레임 전체. 텍스트가 없는 영역은 배경 요약 존 1개로 대체한다.
    pub async fn ocr(&self, req: &OcrRequest) -> Result<Vec<Zone>, CoreError> {
        let started = std::time::Instant::now();
        let frame = self.grabber.grab(req.device_id.as_deref()).await?;
        let regions = resolve_regions(&frame, req.regions.as_deref());
        let region_count = regions.len();

        let analyzer = self.analyzer.clone();
        let job_frame = frame.clone();
        let zones = self
            .pool
            .try_run(move || analyzer.analyze_all(&job_frame, &regions, EmptyRegion::Summarize))
            .await?;

        if self.snapshots.is_enabled() {
            let name = DebugSnapshots::file_name(req.debug_name.as_deref(), Utc::now());
            self.snapshot(frame, name).await;
        }

        info!(
            regions = region_count,
            zones = zones.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OCR 완료"
        );
        Ok(zones)
    }

    /// 단발 템플릿 검색
    pub async fn find_image(&self, req: &FindRequest) -> Result<FindResult, CoreError> {
        let template = self.templates.get(&req.image_name)?;
        let threshold = req.threshold.unwrap_or(self.default_threshold);
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(CoreError::validation(
                "threshold",
                format!("-1.0 ~ 1.0 범위여야 함: {threshold}"),
            ));
        }

        let frame = self.grabber.grab(req.device_id.as_deref()).await?;
        let regions: Option<Vec<Region>> =
            non_empty_regions(req.regions.as_deref()).map(<[Region]>::to_vec);

        let finder = self.finder;
        let boxes = self
            .pool
            .run(move || finder.find(&frame, &template, regions.as_deref(), threshold))
            .await?;

        info!(
            template = %req.image_name,
            threshold,
            matches = boxes.len(),
            "템플릿 검색 완료"
        );
        Ok(FindResult::new(boxes))
    }

    /// 정지 단어가 나타날 때까지 대기
    ///
    /// 타임아웃은 빈 목록이다. 일치했고 디버그 이름이 있으면 스냅샷을 남긴다.
    pub async fn wait_for_text(&self, req: &WaitRequest) -> Result<Vec<Zone>, CoreError> {
        let spec = PollSpec {
            stop_words: req.stop_words.clone(),
            timeout: req.timeout_duration()?,
            interval: req.interval_duration()?,
            regions: req.regions.clone(),
            device_id: req.device_id.clone(),
        };

        let outcome = self.poller.poll(&spec).await?;

        if let (true, Some(name), Some(frame)) = (
            self.snapshots.is_enabled(),
            req.debug_name.as_deref(),
            outcome.frame,
        ) {
            let name = DebugSnapshots::file_name(Some(name), Utc::now());
            self.snapshot(frame, name).await;
        }

        Ok(outcome.result.into_zones())
    }

    /// 로드된 템플릿 수
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// 현재 인식기 이름
    pub fn recognizer_name(&self) -> String {
        self.analyzer.engine().recognizer_name()
    }

    /// 종료 시 인식 엔진 해제
    pub fn shutdown(&self) {
        self.analyzer.engine().teardown();
    }

    async fn snapshot(&self, frame: Arc<Frame>, name: String) {
        let snapshots = self.snapshots.clone();
        if let Err(e) = self
            .pool
            .run(move || snapshots.save_quietly(&frame, &name))
            .await
        {
            debug!("디버그 스냅샷 작업 실패: {e}");
        }
    }
}

fn resolve_regions(frame: &Frame, regions: Option<&[Region]>) -> Vec<Region> {
    match non_empty_regions(regions) {
        Some(r) => r.to_vec(),
        None => vec![frame.full_region()],
    }
}
