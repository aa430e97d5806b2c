//! # Grade Genie
//!
//! 试卷自动评分服务：接收扫描的试卷图片和评分要求，逐张交给视觉大模型评分，
//! 在图片顶部画上分数徽章后连同评语一起返回。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 与业务无关的底层能力
//! - `image_codec` - base64 / data URI 编解码、图片格式嗅探
//! - `bitmap_font` - 内置点阵字体
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张试卷
//! - `LlmService` - 视觉模型评分能力（`VisionModel` trait 的实现）
//! - `grade_parser` - 解析 GRADE / FEEDBACK
//! - `BadgeRenderer` - 画分数徽章
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张试卷"的完整处理流程
//! - `PaperCtx` - 上下文封装（第几张 / 共几张）
//! - `GradingFlow` - 流程编排（评分 → 解析 → 画徽章）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_grader` - 一次请求内全部试卷的顺序处理
//!
//! ### ⑤ 接口层（API）
//! - `api/` - axum 路由、请求解析、响应结构

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{build_router, AppState};
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GradeResult, GradedPaper, GradingRequest, PaperImage};
pub use orchestrator::BatchGrader;
pub use services::{LlmService, MockVisionModel, VisionModel};
pub use workflow::{GradingFlow, PaperCtx};
