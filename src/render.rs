//! 把识别结果重建为带样式、绝对定位的文字元素。

use crate::color::Rgb;
use crate::surface::Surface;
use crate::RecognizedWord;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// 一个绝对定位的文字元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSpan {
    pub text: String,
    /// 左边距（像素）
    pub left: u32,
    /// 上边距（像素）
    pub top: u32,
    /// 字号（像素）
    pub font_size: u32,
    pub color: Rgb,
    pub font_family: String,
}

impl StyledSpan {
    /// 由单词和画布生成元素，颜色取边界框区域的平均色
    pub fn from_word(word: &RecognizedWord, surface: &Surface, font_family: &str) -> Self {
        let bbox = &word.bbox;
        Self {
            text: word.text.clone(),
            left: bbox.x0,
            top: bbox.y0,
            font_size: bbox.height(),
            color: surface.average_color(bbox),
            font_family: font_family.to_string(),
        }
    }

    /// 内联 CSS 样式
    pub fn style(&self) -> String {
        format!(
            "position: absolute; left: {}px; top: {}px; font-size: {}px; color: {}; font-family: {}",
            self.left, self.top, self.font_size, self.color, self.font_family
        )
    }

    /// `<span>` 元素的 HTML
    pub fn to_html(&self) -> String {
        format!(
            "<span style=\"{}\">{}</span>",
            escape_html(&self.style()),
            escape_html(&self.text)
        )
    }
}

/// 输出容器，每次渲染前整体清空
pub trait SpanContainer {
    fn clear(&mut self);
    fn append(&mut self, span: StyledSpan);
    fn spans(&self) -> &[StyledSpan];
}

/// 内存中的输出容器
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanList {
    spans: Vec<StyledSpan>,
}

impl SpanList {
    /// 空容器
    pub fn new() -> Self {
        Self::default()
    }

    /// 元素个数
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// 是否没有元素
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// 所有元素的 HTML，每行一个
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for span in &self.spans {
            html.push_str(&span.to_html());
            html.push('\n');
        }
        html
    }
}

impl SpanContainer for SpanList {
    fn clear(&mut self) {
        self.spans.clear();
    }

    fn append(&mut self, span: StyledSpan) {
        self.spans.push(span);
    }

    fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }
}

/// 清空容器后按输入顺序为每个单词追加一个元素
///
/// 字号取边界框高度，位置取左上角，颜色取该区域的平均色。
/// 宽或高为 0 的边界框取色为黑色。
pub fn render_words<C>(
    words: &[RecognizedWord],
    surface: &Surface,
    container: &mut C,
    font_family: &str,
) where
    C: SpanContainer + ?Sized,
{
    container.clear();

    for word in words {
        container.append(StyledSpan::from_word(word, surface, font_family));
    }
}

/// 生成一个独立的 HTML 页面：图片作为背景，文字元素叠加在上面
pub fn overlay_page(image_uri: &str, width: u32, height: u32, spans: &[StyledSpan]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n");
    let _ = writeln!(
        html,
        "<div style=\"position: relative; width: {width}px; height: {height}px;\">"
    );
    let _ = writeln!(
        html,
        "<img src=\"{}\" width=\"{width}\" height=\"{height}\" style=\"position: absolute; left: 0; top: 0; opacity: 0.35\">",
        escape_html(image_uri)
    );
    for span in spans {
        html.push_str(&span.to_html());
        html.push('\n');
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
