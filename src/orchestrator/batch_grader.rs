//! 批量评分器 - 编排层
//!
//! ## 职责
//!
//! 处理一次请求中的全部试卷：
//!
//! 1. **数量校验**：没有图片或超过上限时直接拒绝
//! 2. **顺序处理**：严格按输入顺序逐张评分，不并发
//! 3. **整体失败**：任何一张失败即终止，不返回部分结果
//! 4. **统计输出**：记录耗时和结果
//!
//! 单张试卷的细节交给 `workflow::GradingFlow`

use std::time::Instant;

use tracing::info;

use crate::error::{AppResult, RequestError};
use crate::models::{GradedPaper, GradingRequest};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{GradingFlow, PaperCtx};

/// 批量评分器
pub struct BatchGrader {
    flow: GradingFlow,
    max_images: usize,
}

impl BatchGrader {
    pub fn new(flow: GradingFlow, max_images: usize) -> Self {
        Self { flow, max_images }
    }

    pub fn model_name(&self) -> &str {
        self.flow.model_name()
    }

    /// 校验试卷数量
    pub fn check_count(&self, count: usize) -> Result<(), RequestError> {
        if count == 0 {
            return Err(RequestError::NoImages);
        }
        if count > self.max_images {
            return Err(RequestError::TooManyImages {
                count,
                max: self.max_images,
            });
        }
        Ok(())
    }

    /// 按顺序批改所有试卷
    ///
    /// 返回结果与输入一一对应、顺序一致
    pub async fn grade_papers(&self, request: &GradingRequest) -> AppResult<Vec<GradedPaper>> {
        let total = request.images.len();
        self.check_count(total)?;

        log_batch_start(total, &request.instructions);
        let started = Instant::now();

        let mut graded = Vec::with_capacity(total);
        for (index, image) in request.images.iter().enumerate() {
            let ctx = PaperCtx::new(index, total);
            let paper = self.flow.run(image, &request.instructions, &ctx).await?;
            graded.push(paper);
        }

        log_batch_complete(total, started.elapsed());
        info!("📤 返回 {} 张带分数标记的试卷", graded.len());

        Ok(graded)
    }
}
