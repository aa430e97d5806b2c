//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 负责一次请求内全部试卷的调度，是 HTTP 层与流程层之间的桥梁。
//!
//! ## 层次关系
//!
//! ```text
//! api::handlers (解析请求)
//!     ↓
//! batch_grader (处理 Vec<PaperImage>)
//!     ↓
//! workflow::GradingFlow (处理单张试卷)
//!     ↓
//! services (能力层：llm / parse / badge)
//!     ↓
//! infrastructure (基础设施：编解码、字体)
//! ```
//!
//! ## 设计原则
//!
//! 1. **顺序执行**：同一请求内的试卷逐张处理
//! 2. **全有或全无**：任一试卷失败则整个请求失败
//! 3. **无业务逻辑**：只做调度和统计，不做具体评分判断

pub mod batch_grader;

pub use batch_grader::BatchGrader;
