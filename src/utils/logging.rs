//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use crate::config::Config;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug 或 info 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},tower_http=info")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录服务启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 阅卷服务启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.bind_addr);
    info!("🤖 模型: {} @ {}", config.llm_model_name, config.llm_api_base_url);
    info!("📦 单次请求最多 {} 张试卷", config.max_images_per_request);
    info!("{}", "=".repeat(60));
}

/// 记录批量评分开始信息
///
/// # 参数
/// - `total`: 试卷总数
/// - `instructions`: 教师评分要求
pub fn log_batch_start(total: usize, instructions: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📝 开始评分: 共 {} 张试卷", total);
    if instructions.trim().is_empty() {
        info!("📋 评分要求: 无");
    } else {
        info!("📋 评分要求: {}", truncate_text(instructions, 80));
    }
}

/// 记录批量评分完成信息
///
/// # 参数
/// - `total`: 试卷总数
/// - `elapsed`: 总耗时
pub fn log_batch_complete(total: usize, elapsed: Duration) {
    info!("✅ 评分完成: {}/{} 张, 耗时 {:.1}s", total, total, elapsed.as_secs_f64());
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
