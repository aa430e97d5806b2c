//! 脚本化的视觉模型
//!
//! 按顺序返回预先设定的回复，不发起任何网络请求。用于测试和本地联调。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AppResult, LlmError};
use crate::models::PaperImage;
use crate::services::llm_service::VisionModel;

/// 一条预设回复：`Some(text)` 为成功回复，`None` 模拟模型返回空内容
pub type ScriptedReply = Option<String>;

pub struct MockVisionModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: String,
    calls: Mutex<Vec<String>>,
}

impl MockVisionModel {
    /// 每次都返回同一条回复
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 按顺序返回给定回复，用完后返回 fallback
    pub fn with_replies<I>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        self.replies = Mutex::new(replies.into_iter().collect());
        self
    }

    /// 已收到的评分要求（每次调用一条）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn grade_image(&self, _image: &PaperImage, instructions: &str) -> AppResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(instructions.to_string());
        }

        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());

        match next {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(LlmError::EmptyContent {
                model: "mock".to_string(),
            }
            .into()),
            None => Ok(self.fallback.clone()),
        }
    }
}
