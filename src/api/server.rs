//! HTTP 服务
//!
//! 路由表、共享状态和启动逻辑

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers;
use crate::config::Config;
use crate::error::AppResult;
use crate::orchestrator::BatchGrader;
use crate::services::{LlmService, VisionModel};
use crate::workflow::GradingFlow;

/// 路由间共享的只读状态
pub struct AppState {
    pub grader: BatchGrader,
}

impl AppState {
    /// 校验配置后使用真实的 LLM 服务构建状态
    pub fn from_config(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let model: Arc<dyn VisionModel> = Arc::new(LlmService::new(config)?);
        Ok(Self::with_model(config, model))
    }

    /// 使用指定的模型构建状态
    pub fn with_model(config: &Config, model: Arc<dyn VisionModel>) -> Self {
        let flow = GradingFlow::new(config, model);
        Self {
            grader: BatchGrader::new(flow, config.max_images_per_request),
        }
    }
}

/// 构建路由
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/health", get(handlers::health))
        .route("/api/grade/", post(handlers::grade_papers))
        .route("/api/grade", post(handlers::grade_papers))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 启动 HTTP 服务，收到 Ctrl-C / SIGTERM 后优雅退出
pub async fn start_server(config: &Config, state: Arc<AppState>) -> Result<()> {
    let app = build_router(state, config.max_body_bytes);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址: {}", config.bind_addr))?;

    info!("✓ HTTP 服务已启动: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    info!("👋 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 收到退出信号，正在关闭服务...");
}
