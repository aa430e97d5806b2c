//! LLM 服务 - 业务能力层
//!
//! 只负责"把一张试卷图片交给视觉模型评分"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 默认走 Gemini 的 OpenAI 兼容端点，也可指向任何兼容服务
//! - 图片以 data URI 形式内联在用户消息里

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::infrastructure::image_codec::to_data_uri;
use crate::models::PaperImage;
use crate::utils::truncate_text;

/// 视觉评分模型
///
/// 流程层只依赖这个 trait，测试时可以替换成脚本化的实现
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// 模型名称（用于日志和健康检查）
    fn model_name(&self) -> &str;

    /// 对一张试卷评分，返回模型的原始文本回复
    async fn grade_image(&self, image: &PaperImage, instructions: &str) -> AppResult<String>;
}

/// 构建评分提示词
pub fn build_grading_prompt(instructions: &str) -> String {
    let instructions = instructions.trim();
    let instructions = if instructions.is_empty() {
        "None"
    } else {
        instructions
    };

    format!(
        r#"You are an expert teacher grading exam papers.
Analyze this exam paper image carefully and provide:
1. A numerical grade/score (e.g., 85/100, 92/100, or appropriate format)
2. Brief feedback on the student's performance

Additional Instructions from Teacher: {}

Be fair, constructive, and professional in your evaluation.

Provide your response in the following format:
GRADE: [score]
FEEDBACK: [your brief feedback]"#,
        instructions
    )
}

/// LLM 服务
///
/// 职责：
/// - 调用视觉模型对单张试卷评分
/// - 提供通用的 LLM 调用接口
/// - 不出现 Vec<PaperImage>
/// - 不关心解析和画图
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> AppResult<Self> {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| AppError::llm_api_failed(&config.llm_model_name, e))?;

        let client = Client::with_config(openai_config).with_http_client(http_client);

        Ok(Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        })
    }

    fn build_failed(&self, source: async_openai::error::OpenAIError) -> AppError {
        AppError::Llm(LlmError::RequestBuildFailed {
            model: self.model_name.clone(),
            source,
        })
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL 或 data URI 列表（可选），会追加到用户消息中
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| self.build_failed(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = match imgs {
            Some(img_urls) if !img_urls.is_empty() => {
                // 使用 Vision API：构建包含文本和图片的内容
                let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                    Vec::with_capacity(img_urls.len() + 1);

                content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                ));

                for url in img_urls {
                    content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ));
                }

                debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(|e| self.build_failed(e))?
            }
            _ => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| self.build_failed(e))?,
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.build_failed(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        debug!("LLM 响应: {}", truncate_text(&content, 120));

        Ok(content)
    }
}

#[async_trait]
impl VisionModel for LlmService {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn grade_image(&self, image: &PaperImage, instructions: &str) -> AppResult<String> {
        let prompt = build_grading_prompt(instructions);
        let data_uri = to_data_uri(image.mime_type, &image.bytes);

        self.send_to_llm(&prompt, None, Some(std::slice::from_ref(&data_uri)))
            .await
    }
}
