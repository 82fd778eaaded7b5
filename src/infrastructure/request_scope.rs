//! 请求作用域
//!
//! 一个作用域对应一个使用方（一个页面、一个服务实例），
//! 拥有自己的 `RequestState`，只跟踪并取消自己发出的调用。
//! 最后一个克隆被丢弃时，仍在进行中的调用全部取消。

use crate::error::ApiResult;
use crate::infrastructure::api_client::{ApiCall, ApiClient, RequestBody};
use crate::infrastructure::cancellation::{RequestHandle, RequestId};
use crate::infrastructure::multipart::MultipartForm;
use crate::infrastructure::progress::ProgressCallback;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

/// 作用域内请求的可观察状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    /// 至少有一个调用在进行中
    pub loading: bool,
    /// 最近一次失败的用户可读信息
    pub error: Option<String>,
    /// 当前上传进度（0-100），上传结束后归零
    pub upload_progress: u8,
}

struct ScopeShared {
    state: watch::Sender<RequestState>,
    in_flight: Mutex<HashMap<RequestId, RequestHandle>>,
}

impl ScopeShared {
    fn handles(&self) -> MutexGuard<'_, HashMap<RequestId, RequestHandle>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, handle: RequestHandle) {
        self.handles().insert(handle.id(), handle);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn release(&self, id: RequestId, upload: bool) {
        let still_loading = {
            let mut handles = self.handles();
            handles.remove(&id);
            !handles.is_empty()
        };
        self.state.send_modify(|s| {
            s.loading = still_loading;
            if upload {
                s.upload_progress = 0;
            }
        });
    }

    fn cancel_all(&self) -> usize {
        let handles: Vec<RequestHandle> = self.handles().values().cloned().collect();
        for handle in &handles {
            handle.cancel();
        }
        handles.len()
    }
}

/// 调用结束（包括 future 被提前丢弃）时从在途表中移除
struct InFlightGuard {
    shared: Arc<ScopeShared>,
    id: RequestId,
    upload: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.shared.release(self.id, self.upload);
    }
}

/// 最后一个作用域克隆被丢弃时取消所有在途调用
struct TeardownGuard {
    shared: Arc<ScopeShared>,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        let cancelled = self.shared.cancel_all();
        if cancelled > 0 {
            debug!("作用域销毁，取消 {} 个在途请求", cancelled);
        }
    }
}

/// 请求作用域
#[derive(Clone)]
pub struct RequestScope {
    client: ApiClient,
    shared: Arc<ScopeShared>,
    _teardown: Arc<TeardownGuard>,
}

impl RequestScope {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        let shared = Arc::new(ScopeShared {
            state,
            in_flight: Mutex::new(HashMap::new()),
        });
        Self {
            client,
            _teardown: Arc::new(TeardownGuard {
                shared: Arc::clone(&shared),
            }),
            shared,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// 发起调用并等待结果
    pub async fn run(&self, call: ApiCall) -> ApiResult<Option<JsonValue>> {
        let (_, pending) = self.begin(call);
        pending.await
    }

    /// 发起调用，立即返回取消句柄和待完成的 future
    pub fn begin(&self, call: ApiCall) -> (RequestHandle, BoxFuture<'static, ApiResult<Option<JsonValue>>>) {
        let (handle, call, guard) = self.prepare(call);
        let client = self.client.clone();
        let shared = Arc::clone(&self.shared);

        let pending = async move {
            let fallback = call.fallback_message().to_string();
            let result = client.request(call).await;
            record_failure(&shared, &result, &fallback);
            drop(guard);
            result
        }
        .boxed();

        (handle, pending)
    }

    /// 与 `run` 相同，但返回原始字节
    pub async fn run_bytes(&self, call: ApiCall) -> ApiResult<Option<Vec<u8>>> {
        let (_, call, guard) = self.prepare(call);
        let fallback = call.fallback_message().to_string();
        let result = self.client.request_bytes(call).await;
        record_failure(&self.shared, &result, &fallback);
        drop(guard);
        result
    }

    pub async fn get(&self, path: &str) -> ApiResult<Option<JsonValue>> {
        self.run(ApiCall::get(path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> ApiResult<Option<JsonValue>> {
        self.run(ApiCall::post(path).json(payload)).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> ApiResult<Option<JsonValue>> {
        self.run(ApiCall::put(path).json(payload)).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> ApiResult<Option<JsonValue>> {
        self.run(ApiCall::patch(path).json(payload)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Option<JsonValue>> {
        self.run(ApiCall::delete(path)).await
    }

    /// multipart 上传，进度同时写入 `RequestState::upload_progress`
    pub async fn upload_file(
        &self,
        path: &str,
        form: MultipartForm,
        on_progress: Option<ProgressCallback>,
    ) -> ApiResult<Option<JsonValue>> {
        let mut call = ApiCall::post(path).multipart(form);
        if let Some(callback) = on_progress {
            call = call.on_progress_arc(callback);
        }
        self.run(call).await
    }

    /// 取消本作用域内的某个调用；不存在或已完成时返回 `false`
    pub fn cancel(&self, id: RequestId) -> bool {
        match self.shared.handles().get(&id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// 取消本作用域内的所有在途调用，返回取消的数量
    pub fn cancel_all(&self) -> usize {
        self.shared.cancel_all()
    }

    /// 在途调用的标识（按发起顺序）
    pub fn in_flight(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.shared.handles().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn state(&self) -> RequestState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.shared.state.subscribe()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.shared.state.send_modify(|s| s.error = Some(message));
    }

    pub fn clear_error(&self) {
        self.shared.state.send_modify(|s| s.error = None);
    }

    fn prepare(&self, call: ApiCall) -> (RequestHandle, ApiCall, InFlightGuard) {
        let handle = match call.handle() {
            Some(handle) => handle.clone(),
            None => self.client.new_handle(&call),
        };
        let mut call = call.with_handle(handle.clone());

        let upload = matches!(call.body(), RequestBody::Multipart(_));
        if upload {
            let shared = Arc::clone(&self.shared);
            let forward = call.progress_callback();
            let callback: ProgressCallback = Arc::new(move |pct: u8| {
                shared.state.send_modify(|s| s.upload_progress = pct);
                if let Some(forward) = &forward {
                    forward(pct);
                }
            });
            call = call.on_progress_arc(callback);
        }

        self.shared.register(handle.clone());
        let guard = InFlightGuard {
            shared: Arc::clone(&self.shared),
            id: handle.id(),
            upload,
        };
        (handle, call, guard)
    }
}

fn record_failure<T>(shared: &ScopeShared, result: &ApiResult<Option<T>>, fallback: &str) {
    if let Err(e) = result {
        let message = e.user_message(fallback);
        shared.state.send_modify(|s| s.error = Some(message));
    }
}

impl std::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("state", &self.state())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
