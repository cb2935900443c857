//! 로컬 인식기 팩토리.
//!
//! `ocr` feature가 켜져 있으면 Tesseract 인식기를, 꺼져 있으면
//! 항상 빈 결과를 내는 [`NullRecognizer`]를 만든다.

use image::RgbImage;
use screensight_core::config::RecognitionConfig;
use screensight_core::ports::text_recognizer::{
    RecognitionError, RecognizedText, RecognizerFactory, TextRecognizer,
};
use std::path::PathBuf;
use std::sync::Arc;

/// 텍스트를 찾지 않는 인식기
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl TextRecognizer for NullRecognizer {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// 설정 기반 로컬 인식기 팩토리
#[derive(Debug, Clone)]
pub struct LocalRecognizerFactory {
    language: String,
    tessdata_path: Option<PathBuf>,
}

impl LocalRecognizerFactory {
    pub fn new(language: impl Into<String>, tessdata_path: Option<PathBuf>) -> Self {
        Self {
            language: language.into(),
            tessdata_path,
        }
    }

    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(config.language.clone(), config.tessdata_path.clone())
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl RecognizerFactory for LocalRecognizerFactory {
    fn create(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        #[cfg(feature = "ocr")]
        {
            let recognizer =
                crate::ocr::TesseractRecognizer::new(&self.language, self.tessdata_path.clone())?;
            Ok(Arc::new(recognizer))
        }

        #[cfg(not(feature = "ocr"))]
        {
            tracing::warn!(
                language = %self.language,
                tessdata = ?self.tessdata_path,
                "ocr feature 비활성화: 텍스트 인식 없이 동작"
            );
            Ok(Arc::new(NullRecognizer))
        }
    }
}
