//! 资源客户端 - 基础设施层
//!
//! 所有网络 I/O 的唯一出口：
//! - 附带凭据（cookie）
//! - JSON / multipart 两种请求体
//! - 上传进度
//! - 按调用取消
//! - 错误分类（只在这里做一次）
//!
//! 401 只会被翻译为 `ApiError::Unauthorized` 并广播一个 `AuthSignal`，
//! 是否跳转登录页由订阅者决定，本层不关心导航

use crate::config::Config;
use crate::error::{
    extract_server_message, ApiError, ApiResult, AppResult, ConfigError, DEFAULT_FALLBACK,
};
use crate::infrastructure::cancellation::{RequestHandle, RequestId};
use crate::infrastructure::multipart::MultipartForm;
use crate::infrastructure::progress::{ProgressCallback, ProgressTracker};
use crate::models::payload::unwrap_envelope;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 认证信号的广播缓冲区大小
const SIGNAL_CAPACITY: usize = 16;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(JsonValue),
    Multipart(MultipartForm),
}

/// 资源客户端广播的认证信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSignal {
    /// 某个调用收到了 401
    Unauthorized { endpoint: String },
}

/// 一次 API 调用的完整描述
pub struct ApiCall {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    progress: Option<ProgressCallback>,
    handle: Option<RequestHandle>,
    signal_unauthorized: bool,
    fallback: String,
    setup_error: Option<String>,
}

impl ApiCall {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            progress: None,
            handle: None,
            signal_unauthorized: true,
            fallback: DEFAULT_FALLBACK.to_string(),
            setup_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// 追加查询参数，空值不发送
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.trim().is_empty() {
            self.query.push((key.into(), value));
        }
        self
    }

    /// JSON 请求体；序列化失败会在发送前以 `ApiError::Setup` 返回
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => self.body = RequestBody::Json(value),
            Err(e) => self.setup_error = Some(format!("无法序列化请求体: {}", e)),
        }
        self
    }

    pub fn json_value(mut self, value: JsonValue) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// 上传进度回调（仅对 multipart 请求生效）
    pub fn on_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn on_progress_arc(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub(crate) fn progress_callback(&self) -> Option<ProgressCallback> {
        self.progress.clone()
    }

    /// 绑定取消句柄
    pub fn with_handle(mut self, handle: RequestHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// 401 时不广播跳转信号（认证接口自身使用）
    pub fn without_unauthorized_signal(mut self) -> Self {
        self.signal_unauthorized = false;
        self
    }

    /// 操作级兜底错误信息
    pub fn fallback(mut self, message: impl Into<String>) -> Self {
        self.fallback = message.into();
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback
    }

    pub fn handle(&self) -> Option<&RequestHandle> {
        self.handle.as_ref()
    }

    /// `METHOD path`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

impl fmt::Debug for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCall")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("progress", &self.progress.is_some())
            .field("handle", &self.handle.as_ref().map(RequestHandle::id))
            .field("signal_unauthorized", &self.signal_unauthorized)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// 资源客户端
///
/// 可廉价克隆，所有克隆共享同一个连接池、cookie 存储和信号通道
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    next_id: AtomicU64,
    signals: broadcast::Sender<AuthSignal>,
}

impl ApiClient {
    /// 按配置创建客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = config.api_base_url.trim().to_string();
        if reqwest::Url::parse(&base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl { url: base_url }.into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|source| ConfigError::HttpClientBuildFailed { source })?;

        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        debug!("资源客户端已创建，后端地址: {}", base_url);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                next_id: AtomicU64::new(1),
                signals,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// 订阅认证信号
    pub fn subscribe_signals(&self) -> broadcast::Receiver<AuthSignal> {
        self.inner.signals.subscribe()
    }

    /// 为调用分配唯一标识和取消句柄
    pub fn new_handle(&self, call: &ApiCall) -> RequestHandle {
        let id = RequestId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        RequestHandle::new(id, call.label())
    }

    /// 相对路径拼接为完整 URL（保留路径末尾的 `/`）
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// 发起一次调用并解析 JSON 响应
    ///
    /// # 返回
    /// - `Ok(Some(value))`: 成功，已拆掉分页 / data 信封；空响应体为 `Null`
    /// - `Ok(None)`: 调用被取消
    /// - `Err(e)`: 已分类的失败
    pub async fn request(&self, call: ApiCall) -> ApiResult<Option<JsonValue>> {
        let endpoint = call.path.clone();
        let Some(bytes) = self.execute(call).await? else {
            return Ok(None);
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(JsonValue::Null));
        }

        let value: JsonValue = serde_json::from_slice(&bytes)
            .map_err(|source| ApiError::Decode { endpoint, source })?;
        Ok(Some(unwrap_envelope(value)))
    }

    /// 发起一次调用并返回原始字节（如 PDF 预览）
    pub async fn request_bytes(&self, call: ApiCall) -> ApiResult<Option<Vec<u8>>> {
        self.execute(call).await
    }

    async fn execute(&self, call: ApiCall) -> ApiResult<Option<Vec<u8>>> {
        let handle = match call.handle.clone() {
            Some(handle) => handle,
            None => self.new_handle(&call),
        };

        let ApiCall {
            method,
            path,
            query,
            body,
            progress,
            signal_unauthorized,
            setup_error,
            ..
        } = call;

        if let Some(message) = setup_error {
            warn!("[{}] 请求构建失败: {}", handle.id(), message);
            return Err(ApiError::Setup {
                endpoint: path,
                message,
            });
        }

        let tracker = match (&body, progress) {
            (RequestBody::Multipart(form), Some(callback)) => {
                Some(ProgressTracker::new(form.file_bytes(), callback))
            }
            _ => None,
        };

        let url = self.url_for(&path);
        let mut builder = self.inner.http.request(method.as_reqwest(), &url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => {
                let form = form.into_reqwest(tracker.clone()).map_err(|e| ApiError::Setup {
                    endpoint: path.clone(),
                    message: e.to_string(),
                })?;
                builder.multipart(form)
            }
        };

        if handle.is_cancelled() {
            info!("[{}] 请求在发出前已取消: {} {}", handle.id(), method, path);
            return Ok(None);
        }

        if let Some(tracker) = &tracker {
            tracker.start();
        }

        debug!("[{}] ➡️ {} {}", handle.id(), method, url);
        let started = Instant::now();

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        let outcome = tokio::select! {
            biased;
            _ = handle.token().cancelled() => None,
            result = exchange => Some(result),
        };

        let Some(result) = outcome else {
            info!("[{}] 请求已取消: {} {}", handle.id(), method, path);
            return Ok(None);
        };

        let (status, bytes) = result.map_err(|e| classify_transport_error(&path, e))?;

        debug!(
            "[{}] ⬅️ {} {} → {} ({} ms)",
            handle.id(),
            method,
            path,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if status.is_success() {
            if let Some(tracker) = &tracker {
                tracker.finish();
            }
            return Ok(Some(bytes.to_vec()));
        }

        let message = serde_json::from_slice::<JsonValue>(&bytes)
            .ok()
            .and_then(|body| extract_server_message(&body));

        if status == reqwest::StatusCode::UNAUTHORIZED {
            debug!("[{}] 未授权: {}", handle.id(), path);
            if signal_unauthorized {
                // 没有订阅者时发送失败，属于正常情况
                let _ = self.inner.signals.send(AuthSignal::Unauthorized {
                    endpoint: path.clone(),
                });
            }
            return Err(ApiError::Unauthorized {
                endpoint: path,
                message,
            });
        }

        warn!(
            "[{}] ⚠️ {} {} 返回 {}: {:?}",
            handle.id(),
            method,
            path,
            status.as_u16(),
            message
        );

        Err(ApiError::BadStatus {
            endpoint: path,
            status: status.as_u16(),
            message,
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

fn classify_transport_error(endpoint: &str, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else if err.is_builder() {
        ApiError::Setup {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    } else {
        ApiError::Network {
            endpoint: endpoint.to_string(),
            source: err,
        }
    }
}
