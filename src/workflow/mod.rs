pub mod grading_flow;
pub mod paper_ctx;

pub use grading_flow::GradingFlow;
pub use paper_ctx::PaperCtx;
