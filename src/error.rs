//! 错误类型
//!
//! 按来源分为四类：请求校验、LLM 调用、图片处理、配置。
//! `Display` 文本会原样返回给调用方，因此使用英文。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::api::dto::ErrorBody;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求校验错误
    #[error(transparent)]
    Request(#[from] RequestError),
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// 图片处理错误
    #[error(transparent)]
    Image(#[from] ImageError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 第 index 张试卷评分失败
    #[error("Error grading paper {index}: {source}")]
    Grading {
        index: usize,
        #[source]
        source: Box<AppError>,
    },
    /// 第 index 张试卷添加分数标记失败
    #[error("Error adding marks to image {index}: {source}")]
    Marking {
        index: usize,
        #[source]
        source: Box<AppError>,
    },
}

/// 请求校验错误
#[derive(Debug, Error)]
pub enum RequestError {
    /// 没有上传图片
    #[error("No images provided")]
    NoImages,
    /// 图片数量超过上限
    #[error("Too many images: {count} provided, at most {max} allowed")]
    TooManyImages { count: usize, max: usize },
    /// base64 解码失败
    #[error("Image {index} is not valid base64: {source}")]
    InvalidBase64 {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },
    /// 无法识别的图片格式
    #[error("Image {index} is not a supported image format")]
    UnsupportedImageFormat { index: usize },
    /// 请求体超过大小上限
    #[error("Request body too large")]
    PayloadTooLarge,
    /// 请求体格式错误
    #[error("Malformed request body: {reason}")]
    MalformedBody { reason: String },
    /// 不支持的 Content-Type
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("failed to build request for model {model}: {source}")]
    RequestBuildFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// API 调用失败
    #[error("model API call failed ({model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("model {model} returned no content")]
    EmptyContent { model: String },
}

/// 图片处理错误
#[derive(Debug, Error)]
pub enum ImageError {
    /// 解码失败
    #[error("failed to decode image: {0}")]
    DecodeFailed(#[source] image::ImageError),
    /// 编码失败
    #[error("failed to encode image: {0}")]
    EncodeFailed(#[source] image::ImageError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("environment variable {var_name} is not set")]
    EnvVarNotFound { var_name: String },
    /// 环境变量取值非法
    #[error("environment variable {var_name} is invalid: {reason}")]
    InvalidValue { var_name: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 包装评分阶段错误，附带试卷序号
    pub fn grading_failed(index: usize, source: AppError) -> Self {
        AppError::Grading {
            index,
            source: Box::new(source),
        }
    }

    /// 包装画标记阶段错误，附带试卷序号
    pub fn marking_failed(index: usize, source: AppError) -> Self {
        AppError::Marking {
            index,
            source: Box::new(source),
        }
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建请求体格式错误
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        AppError::Request(RequestError::MalformedBody {
            reason: reason.into(),
        })
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Request(RequestError::UnsupportedContentType { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Request(RequestError::PayloadTooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Request(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(_)
            | AppError::Image(_)
            | AppError::Config(_)
            | AppError::Grading { .. }
            | AppError::Marking { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ 请求处理失败: {}", self);
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
