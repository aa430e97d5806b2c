//! 评分相关的数据模型
//!
//! 所有实体只存在于单次请求的生命周期内，不做持久化

use serde::{Deserialize, Serialize};

/// 一张待评分的试卷图片
#[derive(Debug, Clone)]
pub struct PaperImage {
    /// 原始图片字节
    pub bytes: Vec<u8>,
    /// 嗅探得到的 MIME 类型，如 `image/png`
    pub mime_type: &'static str,
}

/// 一次评分请求：按顺序排列的试卷图片 + 教师的评分要求
#[derive(Debug, Clone)]
pub struct GradingRequest {
    pub images: Vec<PaperImage>,
    pub instructions: String,
}

impl GradingRequest {
    pub fn new(images: Vec<PaperImage>, instructions: impl Into<String>) -> Self {
        Self {
            images,
            instructions: instructions.into(),
        }
    }
}

/// 单张试卷的评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    /// 分数标签，自由格式，如 "85/100"
    pub grade: String,
    /// 评语
    pub feedback: String,
}

/// 带分数标记的试卷
#[derive(Debug, Clone)]
pub struct GradedPaper {
    /// 叠加了分数徽章的 JPEG 图片
    pub jpeg_bytes: Vec<u8>,
    pub result: GradeResult,
}
