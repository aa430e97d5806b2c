use crate::error::ConfigError;

/// 默认模型端点：Gemini 的 OpenAI 兼容接口
pub const DEFAULT_LLM_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 服务监听地址
    pub bind_addr: String,
    /// 单次请求最多允许的试卷图片数量
    pub max_images_per_request: usize,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
    /// 输出 JPEG 质量 (1-100)
    pub jpeg_quality: u8,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            max_images_per_request: 20,
            max_body_bytes: 50 * 1024 * 1024,
            jpeg_quality: 95,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: DEFAULT_LLM_API_BASE_URL.to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
            llm_timeout_secs: 120,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，缺省项使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过自定义查找函数加载配置（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(default.bind_addr),
            max_images_per_request: parse_var(&lookup, "MAX_IMAGES_PER_REQUEST").unwrap_or(default.max_images_per_request),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES").unwrap_or(default.max_body_bytes),
            jpeg_quality: parse_var(&lookup, "JPEG_QUALITY").unwrap_or(default.jpeg_quality),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            llm_api_key: lookup("GOOGLE_API_KEY")
                .or_else(|| lookup("LLM_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: parse_var(&lookup, "LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_var(&lookup, "LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            llm_timeout_secs: parse_var(&lookup, "LLM_TIMEOUT_SECS").unwrap_or(default.llm_timeout_secs),
        }
    }

    /// 校验配置，启动前调用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "GOOGLE_API_KEY".to_string(),
            });
        }
        if self.max_images_per_request == 0 {
            return Err(ConfigError::InvalidValue {
                var_name: "MAX_IMAGES_PER_REQUEST".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                var_name: "MAX_BODY_BYTES".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                var_name: "JPEG_QUALITY".to_string(),
                reason: format!("{} 不在 1-100 范围内", self.jpeg_quality),
            });
        }
        if self.llm_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var_name: "LLM_TIMEOUT_SECS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

/// 读取并解析单个环境变量，解析失败视为未设置
fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
