//! 텍스트 인식 존과 색상 버킷.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Polygon;

/// 고정된 7가지 이름 색상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBucket {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Gray,
}

impl ColorBucket {
    /// 전체 버킷 목록
    pub const ALL: [ColorBucket; 7] = [
        ColorBucket::Black,
        ColorBucket::White,
        ColorBucket::Red,
        ColorBucket::Green,
        ColorBucket::Blue,
        ColorBucket::Yellow,
        ColorBucket::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBucket::Black => "black",
            ColorBucket::White => "white",
            ColorBucket::Red => "red",
            ColorBucket::Green => "green",
            ColorBucket::Blue => "blue",
            ColorBucket::Yellow => "yellow",
            ColorBucket::Gray => "gray",
        }
    }
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인식된 텍스트 인스턴스 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// 프레임 좌표 4점 다각형
    #[serde(rename = "box")]
    pub polygon: Polygon,
    /// 인식 텍스트
    pub text: String,
    /// 인식 신뢰도 (0.0 ~ 1.0)
    pub score: f64,
    /// 글자 색 (영역 배경 요약 존은 None)
    #[serde(rename = "avg_color", default)]
    pub foreground: Option<ColorBucket>,
    /// 배경 색
    #[serde(rename = "bg_color")]
    pub background: ColorBucket,
}

impl Zone {
    /// 정지 단어 중 하나라도 텍스트에 포함되는지 (대소문자 무시)
    pub fn contains_any(&self, stop_words: &[String]) -> bool {
        let text = self.text.to_lowercase();
        stop_words
            .iter()
            .any(|w| text.contains(&w.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(text: &str) -> Zone {
        Zone {
            polygon: Polygon::from_corners(0, 0, 1, 1),
            text: text.to_string(),
            score: 1.0,
            foreground: None,
            background: ColorBucket::Gray,
        }
    }

    #[test]
    fn bucket_names_are_lowercase() {
        let names: Vec<String> = ColorBucket::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(
            names,
            ["black", "white", "red", "green", "blue", "yellow", "gray"]
        );
        assert_eq!(
            serde_json::to_string(&ColorBucket::Yellow).unwrap(),
            "\"yellow\""
        );
    }

    #[test]
    fn stop_word_match_is_case_insensitive() {
        let z = zone("VICTORY!");
        assert!(z.contains_any(&["victory".to_string()]));
        assert!(z.contains_any(&["defeat".to_string(), "Vic".to_string()]));
        assert!(!z.contains_any(&["defeat".to_string()]));
        assert!(!z.contains_any(&[]));
    }

    #[test]
    fn summary_zone_serializes_null_foreground() {
        let json = serde_json::to_value(zone("")).unwrap();
        assert!(json["avg_color"].is_null());
    }
}
