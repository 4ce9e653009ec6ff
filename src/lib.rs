//! 上传图片 → OCR 识别 → 按原位置、字号和颜色重建文字覆盖层。
//!
//! OCR 本身通过 [`OcrEngine`] 交给外部引擎完成，本库负责画布绘制、
//! 区域取色、样式化文字的生成，以及一个逐字显示的打字机动画。

use serde::{Deserialize, Serialize};

pub mod app;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod render;
pub mod surface;
pub mod typewriter;

pub use app::{LogNotifier, Notifier, OverlayApp, RunOutcome};
pub use color::{average_color, Rgb};
pub use config::OverlayConfig;
pub use engine::{OcrEngine, ProgressFn, Recognition, TesseractCli};
#[cfg(windows)]
pub use engine::WindowsOcr;
pub use error::{OcrError, OverlayError, OverlayResult};
pub use render::{overlay_page, render_words, SpanContainer, SpanList, StyledSpan};
pub use surface::{ImageData, Surface};
pub use typewriter::{SharedText, TextSink, Typewriter, TypingHandle, TypingState};

/// OCR 识别出的单词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedWord {
    /// 单词文本内容
    pub text: String,
    /// 文字区域的边界框（像素坐标，相对于绘制表面）
    pub bbox: BoundingBox,
}

impl RecognizedWord {
    /// 由文本和边界框构造
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// 文字区域的边界框，(x0, y0) 为左上角，(x1, y1) 为右下角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    /// 由左上角和右下角构造
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// 由左上角和宽高构造
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width),
            y1: y.saturating_add(height),
        }
    }

    /// 宽度，坐标颠倒时为 0
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// 高度，坐标颠倒时为 0
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// 宽或高为 0
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// 把识别结果拼成一段文本，单词之间用空格分隔
pub fn join_words(words: &[RecognizedWord]) -> String {
    words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_size_saturates_on_inverted_corners() {
        let bbox = BoundingBox::new(10, 20, 4, 30);
        assert_eq!(bbox.width(), 0);
        assert_eq!(bbox.height(), 10);
        assert!(bbox.is_empty());
    }

    #[test]
    fn bounding_box_from_origin_size() {
        let bbox = BoundingBox::from_origin_size(5, 10, 20, 30);
        assert_eq!(bbox, BoundingBox::new(5, 10, 25, 40));
        assert!(!bbox.is_empty());
    }

    #[test]
    fn word_serializes_with_engine_field_names() {
        let word = RecognizedWord::new("hello", BoundingBox::new(1, 2, 3, 4));
        let json = serde_json::to_value(&word).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "hello",
                "bbox": { "x0": 1, "y0": 2, "x1": 3, "y1": 4 }
            })
        );
    }

    #[test]
    fn join_words_uses_single_spaces() {
        let words = vec![
            RecognizedWord::new("Este", BoundingBox::default()),
            RecognizedWord::new("texto", BoundingBox::default()),
        ];
        assert_eq!(join_words(&words), "Este texto");
        assert_eq!(join_words(&[]), "");
    }
}
