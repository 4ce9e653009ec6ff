use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB 颜色，显示为 CSS 的 `rgb(r,g,b)` 形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// 由三个通道值构造
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// 计算一块 RGBA 像素数据的平均颜色
///
/// 每个像素 4 个通道，alpha 通道不参与计算，末尾不足 4 字节的残余数据被忽略。
/// 每个通道独立求和后整除像素数（向下取整）。没有像素时返回黑色。
pub fn average_color(data: &[u8]) -> Rgb {
    let mut r: u64 = 0;
    let mut g: u64 = 0;
    let mut b: u64 = 0;
    let mut count: u64 = 0;

    for px in data.chunks_exact(4) {
        r += u64::from(px[0]);
        g += u64::from(px[1]);
        b += u64::from(px[2]);
        count += 1;
    }

    mean_color(r, g, b, count)
}

/// 由通道总和与像素数求平均色，像素数为 0 时为黑色
pub(crate) fn mean_color(r: u64, g: u64, b: u64, count: u64) -> Rgb {
    if count == 0 {
        return Rgb::BLACK;
    }

    // 各通道总和不超过 255 * count，均值必然落在 u8 范围内
    Rgb {
        r: (r / count) as u8,
        g: (g / count) as u8,
        b: (b / count) as u8,
    }
}
