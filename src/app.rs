use std::sync::Arc;

use anyhow::Result;

use crate::api::{start_server, AppState};
use crate::config::Config;
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    state: Arc<AppState>,
}

impl App {
    /// 初始化应用：校验配置并构建 LLM 客户端
    pub fn initialize(config: Config) -> Result<Self> {
        let state = Arc::new(AppState::from_config(&config)?);

        log_startup(&config);

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务直到收到退出信号
    pub async fn run(self) -> Result<()> {
        start_server(&self.config, self.state).await
    }
}
