//! Tesseract 텍스트 인식기.
//!
//! `leptess` 기반. `ocr` feature flag 활성화 시에만 빌드된다.
//! 줄(text line) 단위로 박스, 텍스트, 평균 신뢰도를 추출한다.

use image::RgbImage;
use screensight_core::models::geometry::Polygon;
use screensight_core::ports::text_recognizer::{
    classify_engine_message, RecognitionError, RecognizedText, TextRecognizer,
};
use std::io::Cursor;
use std::path::PathBuf;
use tracing::debug;

/// Tesseract 인식기
///
/// LepTess 핸들은 스레드 간 공유하지 않고 호출마다 만든다.
/// 생성 시 한 번 초기화해 언어 데이터가 있는지 확인한다.
pub struct TesseractRecognizer {
    language: String,
    tessdata: Option<String>,
}

impl TesseractRecognizer {
    pub fn new(language: &str, tessdata_path: Option<PathBuf>) -> Result<Self, RecognitionError> {
        let tessdata = tessdata_path.map(|p| p.to_string_lossy().to_string());
        leptess::LepTess::new(tessdata.as_deref(), language)
            .map_err(|e| classify_engine_message(format!("Tesseract 초기화 실패: {e}")))?;
        debug!(language, "Tesseract 초기화 확인");

        Ok(Self {
            language: language.to_string(),
            tessdata,
        })
    }

    fn open(&self, image: &RgbImage) -> Result<leptess::LepTess, RecognitionError> {
        let mut lt = leptess::LepTess::new(self.tessdata.as_deref(), &self.language)
            .map_err(|e| classify_engine_message(format!("Tesseract 초기화 실패: {e}")))?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| RecognitionError::Fatal(format!("이미지 인코딩 실패: {e}")))?;
        lt.set_image_from_mem(&png)
            .map_err(|e| classify_engine_message(format!("이미지 설정 실패: {e}")))?;
        Ok(lt)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedText>, RecognitionError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let mut lt = self.open(image)?;
        let Some(boxes) =
            lt.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_TEXTLINE, true)
        else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for b in boxes.iter() {
            let geom = b.get_geometry();
            lt.set_rectangle(geom.x, geom.y, geom.w, geom.h);

            let text = lt
                .get_utf8_text()
                .map_err(|e| classify_engine_message(format!("텍스트 추출 실패: {e}")))?;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let confidence = f64::from(lt.mean_text_conf().clamp(0, 100)) / 100.0;
            found.push(RecognizedText {
                polygon: Polygon::from_corners(geom.x, geom.y, geom.x + geom.w, geom.y + geom.h),
                text: text.to_string(),
                confidence,
            });
        }

        debug!(lines = found.len(), "Tesseract 인식 완료");
        Ok(found)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_language_data_is_fatal() {
        let result = TesseractRecognizer::new("zz-nonexistent", Some(PathBuf::from("/nonexistent")));
        assert!(matches!(result, Err(RecognitionError::Fatal(_))));
    }
}
