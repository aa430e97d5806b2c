//! HTTP 请求 / 响应的 JSON 结构

use serde::{Deserialize, Serialize};

use crate::infrastructure::to_jpeg_data_uri;
use crate::models::{GradeResult, GradedPaper};

/// `POST /api/grade/` 的 JSON 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeRequestBody {
    /// base64 图片，可带 data URI 前缀
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// 评分成功时的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponseBody {
    pub success: bool,
    /// `data:image/jpeg;base64,...` 形式的带分数图片
    pub graded_images: Vec<String>,
    pub grades: Vec<GradeResult>,
}

impl From<Vec<GradedPaper>> for GradeResponseBody {
    fn from(papers: Vec<GradedPaper>) -> Self {
        let (graded_images, grades) = papers
            .into_iter()
            .map(|paper| (to_jpeg_data_uri(&paper.jpeg_bytes), paper.result))
            .unzip();

        Self {
            success: true,
            graded_images,
            grades,
        }
    }
}

/// 失败时的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `GET /api/health` 的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub model: String,
}
