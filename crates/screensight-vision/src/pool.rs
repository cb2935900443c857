//! 블로킹 작업 워커 풀.
//!
//! 인식, 픽셀 변환, 템플릿 상관, PNG 저장 같은 CPU/블로킹 작업을
//! `spawn_blocking`으로 넘기되 동시 실행 수를 세마포어로 제한한다.

use screensight_core::error::CoreError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// 동시 실행 수가 제한된 블로킹 작업 풀
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// `size`개 작업까지 동시 실행 (최소 1)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        debug!(size, "워커 풀 생성");
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 블로킹 작업 실행 후 결과 대기
    ///
    /// 호출 태스크는 슬롯이 날 때까지, 그리고 작업이 끝날 때까지 대기한다.
    pub async fn run<F, T>(&self, job: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CoreError::Internal(format!("워커 풀 닫힘: {e}")))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| CoreError::Internal(format!("작업 조인 실패: {e}")))
    }

    /// 실패할 수 있는 블로킹 작업 실행
    pub async fn try_run<F, T>(&self, job: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> Result<T, CoreError> + Send + 'static,
        T: Send + 'static,
    {
        self.run(job).await?
    }
}
