//! 시계 포트.
//!
//! 폴링 상태 머신의 경과 시간 측정과 간격 대기를 추상화한다.
//! 테스트에서는 수동 시계로 교체한다.

use async_trait::async_trait;
use std::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync {
    /// 현재 시각
    fn now(&self) -> Instant;

    /// 지정 시간 동안 대기
    async fn sleep(&self, duration: Duration);
}

/// tokio 타이머 기반 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
