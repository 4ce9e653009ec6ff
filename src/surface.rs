//! 绘制表面：解码后的图像画布，支持按矩形区域读取像素。

use crate::color::{average_color, mean_color, Rgb};
use crate::BoundingBox;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// 一块矩形区域的 RGBA 像素数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// 逐行排列，每像素 4 字节
    pub data: Vec<u8>,
}

impl ImageData {
    /// 区域的平均颜色
    pub fn average_color(&self) -> Rgb {
        average_color(&self.data)
    }
}

/// 内存中的 RGBA 画布
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// 指定尺寸的全透明画布
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// 以图片内容创建画布
    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }

    /// 画布宽度（像素）
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// 画布高度（像素）
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// 底层 RGBA 像素
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 把画布尺寸设为图片尺寸并绘制图片
    ///
    /// 与改变画布宽高一样，原有内容会被清空。
    pub fn draw_image(&mut self, image: &DynamicImage) {
        self.pixels = image.to_rgba8();
    }

    /// 读取 (x, y, width, height) 区域的像素
    ///
    /// 区域先裁剪到画布范围内，完全在画布外时返回空数据。
    pub fn image_data(&self, x: u32, y: u32, width: u32, height: u32) -> ImageData {
        let width = width.min(self.width().saturating_sub(x));
        let height = height.min(self.height().saturating_sub(y));

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for py in y..y + height {
            for px in x..x + width {
                data.extend_from_slice(&self.pixels.get_pixel(px, py).0);
            }
        }

        ImageData {
            width,
            height,
            data,
        }
    }

    /// 边界框区域的平均颜色，空区域为黑色
    ///
    /// 超出画布的部分按透明黑计入像素数，与 canvas 的 `getImageData` 一致。
    /// 只遍历与画布重叠的像素，不分配缓冲区。
    pub fn average_color(&self, bbox: &BoundingBox) -> Rgb {
        let count = u64::from(bbox.width()) * u64::from(bbox.height());
        if count == 0 {
            return Rgb::BLACK;
        }

        let x_end = bbox.x1.min(self.width());
        let y_end = bbox.y1.min(self.height());

        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for py in bbox.y0..y_end {
            for px in bbox.x0..x_end {
                let [pr, pg, pb, _] = self.pixels.get_pixel(px, py).0;
                r += u64::from(pr);
                g += u64::from(pg);
                b += u64::from(pb);
            }
        }

        mean_color(r, g, b, count)
    }

    /// 编码为 PNG 字节，供需要文件数据的 OCR 引擎使用
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Cursor::new(Vec::new());
        self.pixels.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

/// 根据字节内容识别格式并解码图片
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    image::load_from_memory(bytes)
}
