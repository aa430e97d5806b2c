//! 基础设施层
//!
//! 与业务无关的底层能力：图片编解码、点阵字体

pub mod bitmap_font;
pub mod image_codec;

pub use image_codec::{paper_image_from_bytes, paper_images_from_base64, to_jpeg_data_uri};
