//! 试卷评分流程 - 流程层
//!
//! 核心职责：定义"一张试卷"的完整处理流程
//!
//! 流程顺序：
//! 1. 视觉模型评分
//! 2. 解析 GRADE / FEEDBACK
//! 3. 在图片上画分数徽章

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{GradedPaper, PaperImage};
use crate::services::{parse_grade_response, BadgeRenderer, VisionModel};
use crate::utils::truncate_text;
use crate::workflow::paper_ctx::PaperCtx;

/// 试卷评分流程
///
/// - 编排单张试卷的处理顺序
/// - 不持有请求中的其他试卷
/// - 只依赖业务能力（services）
pub struct GradingFlow {
    model: Arc<dyn VisionModel>,
    renderer: BadgeRenderer,
}

impl GradingFlow {
    pub fn new(config: &Config, model: Arc<dyn VisionModel>) -> Self {
        Self {
            model,
            renderer: BadgeRenderer::new(config.jpeg_quality),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn run(
        &self,
        image: &PaperImage,
        instructions: &str,
        ctx: &PaperCtx,
    ) -> AppResult<GradedPaper> {
        info!(
            "{} 🤖 正在评分 ({}, {} KB)",
            ctx,
            image.mime_type,
            image.bytes.len() / 1024
        );

        // ========== 步骤 1: 模型评分 ==========
        let reply = self
            .model
            .grade_image(image, instructions)
            .await
            .map_err(|e| {
                warn!("{} ❌ 模型评分失败: {}", ctx, e);
                AppError::grading_failed(ctx.paper_index, e)
            })?;

        debug!("{} 模型回复: {}", ctx, truncate_text(&reply, 200));

        // ========== 步骤 2: 解析结果 ==========
        let result = parse_grade_response(&reply);
        info!("{} ✓ 分数: {}", ctx, result.grade);

        // ========== 步骤 3: 画分数徽章 ==========
        let jpeg_bytes = self
            .renderer
            .render(&image.bytes, &result.grade)
            .map_err(|e| {
                warn!("{} ❌ 添加分数标记失败: {}", ctx, e);
                AppError::marking_failed(ctx.paper_index, e.into())
            })?;

        Ok(GradedPaper { jpeg_bytes, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockVisionModel;
    use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, RgbImage};

    fn png_page() -> PaperImage {
        let page = RgbImage::from_pixel(240, 320, image::Rgb([250, 250, 250]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(page.as_raw(), 240, 320, ExtendedColorType::Rgb8)
            .unwrap();
        PaperImage {
            bytes,
            mime_type: "image/png",
        }
    }

    fn flow_with(model: MockVisionModel) -> GradingFlow {
        GradingFlow::new(&Config::default(), Arc::new(model))
    }

    #[tokio::test]
    async fn test_run_produces_grade_and_jpeg() {
        let flow = flow_with(MockVisionModel::new("GRADE: 88/100\nFEEDBACK: Well done."));

        let graded = flow
            .run(&png_page(), "", &PaperCtx::new(0, 1))
            .await
            .unwrap();

        assert_eq!(graded.result.grade, "88/100");
        assert_eq!(graded.result.feedback, "Well done.");
        assert_eq!(
            image::guess_format(&graded.jpeg_bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_model_failure_names_paper_index() {
        let flow = flow_with(MockVisionModel::new("unused").with_replies([None]));

        let err = flow
            .run(&png_page(), "", &PaperCtx::new(2, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Grading { index: 2, .. }));
        assert!(err.to_string().starts_with("Error grading paper 2:"));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_marking_failure() {
        let flow = flow_with(MockVisionModel::new("GRADE: 50/100\nFEEDBACK: ok"));
        let broken = PaperImage {
            // 只有 PNG 文件头，没有图像数据
            bytes: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
            mime_type: "image/png",
        };

        let err = flow
            .run(&broken, "", &PaperCtx::new(1, 2))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Marking { index: 1, .. }));
    }
}
