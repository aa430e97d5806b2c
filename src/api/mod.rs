//! API 模块
//!
//! 负责所有与 HTTP 客户端的交互

pub mod dto;
pub mod handlers;
pub mod server;

// 重新导出常用类型
pub use dto::{ErrorBody, GradeRequestBody, GradeResponseBody, HealthBody};
pub use server::{build_router, start_server, AppState};
