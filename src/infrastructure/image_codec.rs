//! 图片编解码 - 基础设施层
//!
//! 负责 base64 / data URI 与原始字节之间的转换，以及图片格式嗅探

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use image::ImageFormat;

use crate::error::RequestError;
use crate::models::PaperImage;

/// 解码时对末尾 `=` 补齐不做要求
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// 允许上传的图片格式
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// 解码单张 base64 图片
///
/// 若包含逗号（如 `data:image/png;base64,...`），只取第一个逗号之后的部分。
/// 中间的换行等空白会被忽略。
pub fn decode_image_payload(index: usize, payload: &str) -> Result<Vec<u8>, RequestError> {
    let data = match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    };

    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    LENIENT
        .decode(cleaned.as_bytes())
        .map_err(|source| RequestError::InvalidBase64 { index, source })
}

/// 根据文件头判断图片格式，返回 MIME 类型
pub fn sniff_mime(index: usize, bytes: &[u8]) -> Result<&'static str, RequestError> {
    match image::guess_format(bytes) {
        Ok(format) if SUPPORTED_FORMATS.contains(&format) => Ok(format.to_mime_type()),
        _ => Err(RequestError::UnsupportedImageFormat { index }),
    }
}

/// 校验原始字节并包装为 `PaperImage`
pub fn paper_image_from_bytes(index: usize, bytes: Vec<u8>) -> Result<PaperImage, RequestError> {
    let mime_type = sniff_mime(index, &bytes)?;
    Ok(PaperImage { bytes, mime_type })
}

/// 批量解码 base64 图片，任何一张失败则整体失败
pub fn paper_images_from_base64(payloads: &[String]) -> Result<Vec<PaperImage>, RequestError> {
    payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            let bytes = decode_image_payload(index, payload)?;
            paper_image_from_bytes(index, bytes)
        })
        .collect()
}

/// 任意 MIME 的 data URI
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// JPEG 图片的 data URI
pub fn to_jpeg_data_uri(bytes: &[u8]) -> String {
    to_data_uri("image/jpeg", bytes)
}
