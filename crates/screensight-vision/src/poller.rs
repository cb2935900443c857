//! 조건 폴러.
//!
//! "텍스트가 나타날 때까지 대기" 상태 머신:
//!
//! ```text
//! Capturing → Analyzing → Deciding ─┬→ Matched            (종료)
//!     ↑                             ├→ TimedOut           (종료)
//!     └──────── WaitingForInterval ←┘
//! ```
//!
//! 대기는 `WaitingForInterval`에서만 일어난다. 매 반복 새 프레임을 캡처하며
//! 반복 사이에 이어지는 상태는 없다. 타임아웃은 실패가 아니라 빈 결과다.

use screensight_core::error::CoreError;
use screensight_core::models::frame::{Frame, Region};
use screensight_core::models::poll::PollResult;
use screensight_core::models::zone::Zone;
use screensight_core::ports::clock::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, trace};

use crate::analyzer::{EmptyRegion, RegionAnalyzer};
use crate::capture::FrameGrabber;
use crate::pool::WorkerPool;

/// 폴링 조건
#[derive(Debug, Clone, Default)]
pub struct PollSpec {
    /// 대소문자 무시 부분 문자열
    pub stop_words: Vec<String>,
    pub timeout: Duration,
    pub interval: Duration,
    /// None 또는 빈 목록이면 프레임 전체
    pub regions: Option<Vec<Region>>,
    pub device_id: Option<String>,
}

/// 폴링 결과와 부가 정보
#[derive(Debug)]
pub struct PollOutcome {
    pub result: PollResult,
    /// 일치 시점의 프레임 (타임아웃이면 None)
    pub frame: Option<Arc<Frame>>,
    pub captures: u32,
    pub elapsed: Duration,
}

#[derive(Debug)]
enum PollState {
    Capturing,
    Analyzing(Arc<Frame>),
    Deciding { frame: Arc<Frame>, zones: Vec<Zone> },
    WaitingForInterval,
}

/// 조건 폴러
pub struct ConditionPoller {
    grabber: Arc<FrameGrabber>,
    analyzer: Arc<RegionAnalyzer>,
    pool: WorkerPool,
    clock: Arc<dyn Clock>,
}

impl ConditionPoller {
    pub fn new(
        grabber: Arc<FrameGrabber>,
        analyzer: Arc<RegionAnalyzer>,
        pool: WorkerPool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            grabber,
            analyzer,
            pool,
            clock,
        }
    }

    /// 일치 또는 타임아웃까지 폴링
    ///
    /// 캡처/인식 실패는 즉시 에러로 끝난다.
    pub async fn poll(&self, spec: &PollSpec) -> Result<PollOutcome, CoreError> {
        let started = self.clock.now();
        let mut captures = 0u32;
        let mut state = PollState::Capturing;

        loop {
            state = match state {
                PollState::Capturing => {
                    captures += 1;
                    let frame = self.grabber.grab_fresh(spec.device_id.as_deref()).await?;
                    PollState::Analyzing(frame)
                }
                PollState::Analyzing(frame) => {
                    let zones = self.analyze(&frame, spec.regions.as_deref()).await?;
                    PollState::Deciding { frame, zones }
                }
                PollState::Deciding { frame, zones } => {
                    let elapsed = self.elapsed_since(started);
                    if zones.iter().any(|z| z.contains_any(&spec.stop_words)) {
                        info!(
                            captures,
                            elapsed_ms = elapsed.as_millis() as u64,
                            zones = zones.len(),
                            "대기 조건 일치"
                        );
                        return Ok(PollOutcome {
                            result: PollResult::Matched(zones),
                            frame: Some(frame),
                            captures,
                            elapsed,
                        });
                    }
                    if elapsed >= spec.timeout {
                        info!(
                            captures,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "대기 시간 초과"
                        );
                        return Ok(PollOutcome {
                            result: PollResult::TimedOut,
                            frame: None,
                            captures,
                            elapsed,
                        });
                    }
                    PollState::WaitingForInterval
                }
                PollState::WaitingForInterval => {
                    self.clock.sleep(spec.interval).await;
                    PollState::Capturing
                }
            };
            trace!(?captures, state = state.label(), "폴링 상태 전이");
        }
    }

    async fn analyze(
        &self,
        frame: &Arc<Frame>,
        regions: Option<&[Region]>,
    ) -> Result<Vec<Zone>, CoreError> {
        let regions: Vec<Region> = match regions.filter(|r| !r.is_empty()) {
            Some(r) => r.to_vec(),
            None => vec![frame.full_region()],
        };
        let frame = frame.clone();
        let analyzer = self.analyzer.clone();
        self.pool
            .try_run(move || analyzer.analyze_all(&frame, &regions, EmptyRegion::Omit))
            .await
    }

    fn elapsed_since(&self, started: Instant) -> Duration {
        self.clock.now().saturating_duration_since(started)
    }
}

impl PollState {
    fn label(&self) -> &'static str {
        match self {
            PollState::Capturing => "capturing",
            PollState::Analyzing(_) => "analyzing",
            PollState::Deciding { .. } => "deciding",
            PollState::WaitingForInterval => "waiting",
        }
    }
}
