//! 프레임 획득.
//!
//! [`ScreenSource`]에서 원시 캡처를 받아 워커 풀에서 디코딩한다.
//! 단발 분석/검색은 장치별 단기 캐시를 거치고, 폴러는 항상 새로 캡처한다.

use parking_lot::Mutex;
use screensight_core::error::CoreError;
use screensight_core::models::frame::Frame;
use screensight_core::ports::clock::Clock;
use screensight_core::ports::screen_source::ScreenSource;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::decoder::FrameDecoder;
use crate::pool::WorkerPool;

/// 장치별 최근 프레임 캐시 (TTL 0이면 비활성)
pub struct FrameCache {
    ttl: Duration,
    entries: Mutex<HashMap<Option<String>, (Instant, Arc<Frame>)>>,
}

impl FrameCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// `now` 기준 TTL 안의 프레임
    pub fn get(&self, device: Option<&str>, now: Instant) -> Option<Arc<Frame>> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.lock();
        let (captured_at, frame) = entries.get(&device.map(str::to_string))?;
        (now.saturating_duration_since(*captured_at) < self.ttl).then(|| frame.clone())
    }

    pub fn put(&self, device: Option<&str>, frame: Arc<Frame>, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        self.entries
            .lock()
            .insert(device.map(str::to_string), (now, frame));
    }
}

/// 캡처 + 디코딩 + 캐시
pub struct FrameGrabber {
    source: Arc<dyn ScreenSource>,
    decoder: FrameDecoder,
    cache: FrameCache,
    clock: Arc<dyn Clock>,
    pool: WorkerPool,
    default_device: Option<String>,
}

impl FrameGrabber {
    pub fn new(
        source: Arc<dyn ScreenSource>,
        clock: Arc<dyn Clock>,
        pool: WorkerPool,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            decoder: FrameDecoder::new(),
            cache: FrameCache::new(cache_ttl),
            clock,
            pool,
            default_device: None,
        }
    }

    /// 요청에 장치가 없을 때 사용할 장치
    pub fn with_default_device(mut self, device: Option<String>) -> Self {
        self.default_device = device;
        self
    }

    /// 캐시를 허용하는 프레임 획득
    pub async fn grab(&self, device_id: Option<&str>) -> Result<Arc<Frame>, CoreError> {
        let device = self.resolve(device_id);
        if let Some(frame) = self.cache.get(device, self.clock.now()) {
            debug!(device, "캐시된 프레임 재사용");
            return Ok(frame);
        }
        self.capture(device).await
    }

    /// 항상 새로 캡처
    pub async fn grab_fresh(&self, device_id: Option<&str>) -> Result<Arc<Frame>, CoreError> {
        let device = self.resolve(device_id);
        self.capture(device).await
    }

    fn resolve<'a>(&'a self, device_id: Option<&'a str>) -> Option<&'a str> {
        device_id.or(self.default_device.as_deref())
    }

    async fn capture(&self, device: Option<&str>) -> Result<Arc<Frame>, CoreError> {
        let started = self.clock.now();
        let raw = self.source.capture(device).await?;
        let bytes = raw.len();

        let decoder = self.decoder;
        let frame = Arc::new(self.pool.try_run(move || decoder.decode(&raw)).await?);

        let now = self.clock.now();
        debug!(
            device,
            source = self.source.name(),
            bytes,
            width = frame.width(),
            height = frame.height(),
            elapsed_ms = now.saturating_duration_since(started).as_millis() as u64,
            "프레임 캡처"
        );
        self.cache.put(device, frame.clone(), now);
        Ok(frame)
    }
}
