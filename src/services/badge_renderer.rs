//! 分数徽章绘制 - 业务能力层
//!
//! 只负责"在图片顶部居中画一个红底白字的分数标记"，不关心分数从哪来

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use tracing::debug;

use crate::error::ImageError;
use crate::infrastructure::bitmap_font::{self, GLYPH_SPACING, GLYPH_WIDTH};

/// 徽章样式
#[derive(Debug, Clone)]
pub struct BadgeStyle {
    pub fill: Rgb<u8>,
    pub outline: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub outline_width: u32,
    pub padding: u32,
    /// 文字顶部距图片上边缘的距离
    pub top: u32,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            fill: Rgb([255, 0, 0]),
            outline: Rgb([139, 0, 0]),
            text_color: Rgb([255, 255, 255]),
            outline_width: 3,
            padding: 15,
            top: 20,
        }
    }
}

/// 徽章在图片上的位置，矩形坐标为闭区间且可能超出图片边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeLayout {
    pub scale: u32,
    pub text_x: i64,
    pub text_y: i64,
    pub rect: (i64, i64, i64, i64),
}

/// 徽章文字
pub fn badge_text(grade: &str) -> String {
    format!("Grade: {}", grade)
}

/// 分数徽章绘制器
pub struct BadgeRenderer {
    style: BadgeStyle,
    jpeg_quality: u8,
}

impl BadgeRenderer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self::with_style(BadgeStyle::default(), jpeg_quality)
    }

    pub fn with_style(style: BadgeStyle, jpeg_quality: u8) -> Self {
        Self {
            style,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// 解码图片，画上分数徽章，重新编码为 JPEG
    pub fn render(&self, image_bytes: &[u8], grade: &str) -> Result<Vec<u8>, ImageError> {
        let mut img = image::load_from_memory(image_bytes)
            .map_err(ImageError::DecodeFailed)?
            .to_rgb8();

        let text = badge_text(grade);
        self.draw_badge(&mut img, &text);

        debug!(
            "徽章已绘制: {}x{}, 文字 \"{}\"",
            img.width(),
            img.height(),
            text
        );

        self.encode_jpeg(&img)
    }

    /// 计算徽章布局
    ///
    /// 字号随图片宽度变化，文字放不下时逐级缩小
    pub fn layout(&self, width: u32, height: u32, text: &str) -> BadgeLayout {
        let padding = self.style.padding.min(width.min(height) / 10);

        let mut scale = (width / 160).clamp(2, 12);
        while scale > 1 && bitmap_font::text_width(text, scale) + 2 * padding > width {
            scale -= 1;
        }

        let text_w = bitmap_font::text_width(text, scale);
        let text_h = bitmap_font::text_height(scale);

        let text_x = (i64::from(width) - i64::from(text_w)) / 2;
        let text_y = i64::from(self.style.top.min(height.saturating_sub(text_h) / 2));
        let padding = i64::from(padding);

        BadgeLayout {
            scale,
            text_x,
            text_y,
            rect: (
                text_x - padding,
                text_y - padding,
                text_x + i64::from(text_w) + padding,
                text_y + i64::from(text_h) + padding,
            ),
        }
    }

    /// 在图片上画徽章（背景、描边、文字）
    pub fn draw_badge(&self, img: &mut RgbImage, text: &str) {
        let layout = self.layout(img.width(), img.height(), text);
        let (x0, y0, x1, y1) = layout.rect;
        let ow = i64::from(self.style.outline_width);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let on_border = x - x0 < ow || x1 - x < ow || y - y0 < ow || y1 - y < ow;
                let color = if on_border {
                    self.style.outline
                } else {
                    self.style.fill
                };
                put_pixel_clipped(img, x, y, color);
            }
        }

        let scale = i64::from(layout.scale);
        let advance = i64::from(GLYPH_WIDTH + GLYPH_SPACING) * scale;

        for (i, c) in text.chars().enumerate() {
            let glyph = bitmap_font::glyph(c);
            let origin_x = layout.text_x + i as i64 * advance;

            for row in 0..bitmap_font::GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !bitmap_font::is_set(&glyph, col, row) {
                        continue;
                    }
                    let px = origin_x + i64::from(col) * scale;
                    let py = layout.text_y + i64::from(row) * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            put_pixel_clipped(img, px + dx, py + dy, self.style.text_color);
                        }
                    }
                }
            }
        }
    }

    fn encode_jpeg(&self, img: &RgbImage) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
        encoder
            .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
            .map_err(ImageError::EncodeFailed)?;
        Ok(out)
    }
}

fn put_pixel_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(img.width()) && y < i64::from(img.height()) {
        img.put_pixel(x as u32, y as u32, color);
    }
}
