use serde_json::Value;
use thiserror::Error;

/// 网络不可达时展示给用户的提示
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
/// 请求超时时展示给用户的提示
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please check your connection.";
/// 没有任何可用信息时的兜底提示
pub const DEFAULT_FALLBACK: &str = "An error occurred";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 业务服务错误（已翻译为用户可读信息）
    #[error("服务错误: {0}")]
    Service(#[from] ServiceError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 失败分类
///
/// 由资源客户端统一产生一次，所有业务服务复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 401，需要重新登录
    Unauthorized,
    /// 服务端拒绝（401 以外的非 2xx，或响应无法解析）
    Rejected,
    /// 请求已发出但没有收到响应
    Network,
    /// 调用方主动取消，不是错误
    Cancelled,
    /// 请求尚未发出就失败，属于编程错误
    Setup,
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 后端返回 401
    #[error("未授权访问 ({endpoint})")]
    Unauthorized {
        endpoint: String,
        message: Option<String>,
    },
    /// 后端返回 401 以外的错误状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadStatus {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 网络请求失败
    #[error("网络请求失败 ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 请求超时
    #[error("请求超时 ({endpoint})")]
    Timeout { endpoint: String },
    /// 请求构建失败
    #[error("请求构建失败 ({endpoint}): {message}")]
    Setup { endpoint: String, message: String },
    /// 响应 JSON 解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// 失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Unauthorized { .. } => FailureKind::Unauthorized,
            ApiError::BadStatus { .. } | ApiError::Decode { .. } => FailureKind::Rejected,
            ApiError::Network { .. } | ApiError::Timeout { .. } => FailureKind::Network,
            ApiError::Setup { .. } => FailureKind::Setup,
        }
    }

    /// HTTP 状态码（如果收到了响应）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 后端在错误响应体中给出的信息
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::BadStatus { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Unauthorized { endpoint, .. }
            | ApiError::BadStatus { endpoint, .. }
            | ApiError::Network { endpoint, .. }
            | ApiError::Timeout { endpoint }
            | ApiError::Setup { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// 生成面向用户的单条错误信息
    ///
    /// # 参数
    /// - `fallback`: 当后端没有给出信息时使用的操作级兜底文本
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            ApiError::Setup { message, .. } => format!("Request setup error: {}", message),
            ApiError::Decode { .. } => fallback.to_string(),
            ApiError::Unauthorized { message, .. } | ApiError::BadStatus { message, .. } => {
                message.clone().unwrap_or_else(|| fallback.to_string())
            }
        }
    }
}

/// 业务服务错误
///
/// 每个领域操作失败时只暴露一条可读信息，同时保留分类以便调用方区分 401 / 取消
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: FailureKind,
    status: Option<u16>,
    message: String,
}

impl ServiceError {
    /// 从 API 错误翻译
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self {
            kind: err.kind(),
            status: err.status(),
            message: err.user_message(fallback),
        }
    }

    /// 调用被取消
    pub fn cancelled(operation: &str) -> Self {
        Self {
            kind: FailureKind::Cancelled,
            status: None,
            message: format!("{} (cancelled)", operation),
        }
    }

    /// 请求在本地就无法组装（如读取上传文件失败）
    pub fn setup(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Setup,
            status: None,
            message: format!("Request setup error: {}", detail),
        }
    }

    /// 后端返回的数据与预期结构不符
    pub fn unexpected_payload(fallback: &str) -> Self {
        Self {
            kind: FailureKind::Rejected,
            status: None,
            message: fallback.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == FailureKind::Unauthorized
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 后端地址无效
    #[error("后端地址无效: {url}")]
    InvalidBaseUrl { url: String },
    /// HTTP 客户端初始化失败
    #[error("HTTP客户端初始化失败: {source}")]
    HttpClientBuildFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// 从错误响应体中提取后端给出的信息
///
/// 优先级：`detail` → `error` → `message` → `non_field_errors` → 第一个字段错误
pub fn extract_server_message(body: &Value) -> Option<String> {
    if let Value::String(_) = body {
        return message_text(body);
    }

    let obj = body.as_object()?;
    for key in ["detail", "error", "message", "non_field_errors"] {
        if let Some(text) = obj.get(key).and_then(message_text) {
            return Some(text);
        }
    }

    obj.iter()
        .find_map(|(field, value)| message_text(value).map(|msg| format!("{}: {}", field, msg)))
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(message_text),
        _ => None,
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 资源客户端结果类型
pub type ApiResult<T> = Result<T, ApiError>;

/// 业务服务结果类型
pub type ServiceResult<T> = Result<T, ServiceError>;
