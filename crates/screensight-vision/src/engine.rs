//! 공유 인식 엔진 핸들.
//!
//! 프로세스 전역 인식기 1개를 읽기/쓰기 잠금으로 보호한다.
//! - 인식 호출: 읽기 잠금을 잡은 채 실행 (동시 실행 가능)
//! - 재초기화: 쓰기 잠금 → 새 인식기 생성 → 교체 → 해제
//!
//! 쓰기 잠금을 잡는 동안 새 인식 호출은 대기하고, 진행 중인 호출이 끝나야
//! 재초기화가 시작된다. 교체가 끝나기 전에는 아무도 새 핸들을 보지 못한다.
//!
//! 인식기 이름은 별도로 캐시한다. 이름 조회는 핸들 잠금을 잡지 않으므로
//! 재초기화 중에도 기다리지 않는다.

use image::RgbImage;
use parking_lot::{Mutex, RwLock};
use screensight_core::ports::text_recognizer::{
    RecognitionError, RecognizedText, RecognizerFactory, TextRecognizer,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 인식 1회 결과와 그 호출이 사용한 엔진 세대
#[derive(Debug)]
pub struct Attempt {
    pub generation: u64,
    pub result: Result<Vec<RecognizedText>, RecognitionError>,
}

/// 재초기화 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reinit {
    /// 이 호출자가 엔진을 새로 만들었다
    Rebuilt,
    /// 다른 호출자가 이미 재초기화했다
    AlreadyFresh,
}

/// 공유 인식 엔진
pub struct RecognitionEngine {
    factory: Arc<dyn RecognizerFactory>,
    handle: RwLock<Arc<dyn TextRecognizer>>,
    /// 현재 인식기 이름 (교체 직후 갱신)
    name: Mutex<Arc<str>>,
    /// 재초기화마다 1씩 증가 (쓰기 잠금 안에서만 변경)
    generation: AtomicU64,
}

impl RecognitionEngine {
    /// 팩토리로 초기 인식기를 만들어 엔진 생성
    pub fn new(factory: Arc<dyn RecognizerFactory>) -> Result<Self, RecognitionError> {
        let recognizer = factory.create()?;
        info!("인식 엔진 초기화: {}", recognizer.name());
        Ok(Self {
            factory,
            name: Mutex::new(Arc::from(recognizer.name())),
            handle: RwLock::new(recognizer),
            generation: AtomicU64::new(0),
        })
    }

    /// 현재 엔진 세대
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// 현재 인식기 이름
    pub fn recognizer_name(&self) -> String {
        self.name.lock().to_string()
    }

    /// 읽기 잠금 아래에서 인식 1회 (블로킹)
    pub fn recognize(&self, image: &RgbImage) -> Attempt {
        let recognizer = self.handle.read();
        let generation = self.generation.load(Ordering::Acquire);
        let result = recognizer.recognize(image);
        Attempt { generation, result }
    }

    /// `failed_generation`에서 일시 오류를 본 호출자의 재초기화 요청
    ///
    /// 그 사이 세대가 바뀌었으면 다시 만들지 않는다.
    pub fn reinitialize(&self, failed_generation: u64) -> Result<Reinit, RecognitionError> {
        let mut handle = self.handle.write();
        let current = self.generation.load(Ordering::Acquire);
        if current != failed_generation {
            debug!(
                failed_generation,
                current, "다른 호출자가 이미 엔진을 재초기화함"
            );
            return Ok(Reinit::AlreadyFresh);
        }

        let fresh = self.factory.create()?;
        *self.name.lock() = Arc::from(fresh.name());
        *handle = fresh;
        self.generation.store(current + 1, Ordering::Release);
        info!(generation = current + 1, "인식 엔진 재초기화 완료");
        Ok(Reinit::Rebuilt)
    }

    /// 종료 시 엔진 해제: 이후 호출은 실패한다
    pub fn teardown(&self) {
        let mut handle = self.handle.write();
        let inert: Arc<dyn TextRecognizer> = Arc::new(ShutDownRecognizer);
        *self.name.lock() = Arc::from(inert.name());
        *handle = inert;
        self.generation.fetch_add(1, Ordering::AcqRel);
        warn!("인식 엔진 해제");
    }
}

/// 해제 후 자리에 놓이는 인식기
struct ShutDownRecognizer;

impl TextRecognizer for ShutDownRecognizer {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        Err(RecognitionError::Fatal("인식 엔진이 해제되었습니다".to_string()))
    }

    fn name(&self) -> &str {
        "shut-down"
    }
}
