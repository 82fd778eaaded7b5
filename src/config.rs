use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 API 根地址，所有资源路径都相对于它
    pub api_base_url: String,
    /// 单个请求的超时时间（秒），不做自动重试
    pub request_timeout_secs: u64,
    /// 收到 401 后跳转的登录路由
    pub login_route: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 命令行登录凭据（可选） ---
    pub username: Option<String>,
    pub password: Option<String>,
    /// 仪表盘中展示的条目上限
    pub dashboard_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/".to_string(),
            request_timeout_secs: 30,
            login_route: "/login".to_string(),
            verbose_logging: false,
            username: None,
            password: None,
            dashboard_limit: 5,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，缺失或无法解析的值使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置
    ///
    /// # 参数
    /// - `path`: 配置文件路径
    ///
    /// # 返回
    /// 文件中未出现的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source: e,
            })
        })?;

        toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source: e,
            })
        })
    }

    /// 加载配置：若设置了 `EXAM_CONFIG` 则先读文件，再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("EXAM_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim())?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("EXAM_API_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            login_route: std::env::var("LOGIN_ROUTE").unwrap_or(self.login_route),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            username: std::env::var("EXAM_USERNAME").ok().or(self.username),
            password: std::env::var("EXAM_PASSWORD").ok().or(self.password),
            dashboard_limit: std::env::var("DASHBOARD_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.dashboard_limit),
        }
    }

    /// 指向指定后端地址的配置，其余取默认值
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// 是否提供了完整的登录凭据
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}
