//! 참조 템플릿 저장소.
//!
//! 디렉토리의 `*.png`를 파일 이름(확장자 제외)으로 등록한다.
//! 시작 시 한 번 로드하며 이후 읽기 전용이다.

use image::GrayImage;
use screensight_core::error::CoreError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::pixel;

/// 그레이스케일 템플릿 모음
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, Arc<GrayImage>>,
}

impl TemplateStore {
    /// 빈 저장소
    pub fn empty() -> Self {
        Self::default()
    }

    /// 디렉토리에서 PNG 템플릿 로드
    ///
    /// 디렉토리가 없으면 빈 저장소를 반환한다. 디코딩에 실패한 파일은 건너뛴다.
    pub fn load_dir(dir: &Path) -> Result<Self, CoreError> {
        let mut store = Self::empty();
        if !dir.is_dir() {
            warn!("템플릿 디렉토리 없음: {}", dir.display());
            return Ok(store);
        }

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if !is_png {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match image::open(&path) {
                Ok(img) => {
                    let gray = pixel::to_gray(&img.to_rgb8());
                    debug!(name, width = gray.width(), height = gray.height(), "템플릿 로드");
                    store.insert(name, gray);
                }
                Err(e) => warn!("템플릿 디코딩 실패, 건너뜀: {}: {e}", path.display()),
            }
        }

        info!("템플릿 {}개 로드: {}", store.len(), dir.display());
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: GrayImage) {
        self.templates.insert(name.into(), Arc::new(template));
    }

    /// 이름으로 템플릿 조회
    pub fn get(&self, name: &str) -> Result<Arc<GrayImage>, CoreError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::TemplateNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// 등록된 이름 (정렬)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
