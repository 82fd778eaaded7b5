//! 请求取消句柄 - 基础设施层
//!
//! 每个调用对应一个句柄，直接交给调用方，不存在全局的请求登记表

use std::fmt::Display;
use tokio_util::sync::CancellationToken;

/// 请求标识
///
/// 在同一个 `ApiClient` 内单调递增，保证唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// 单个调用的取消句柄
///
/// 可克隆；任意一份克隆调用 `cancel()` 都会中止对应的请求。
/// 请求结束后再取消不会产生任何效果。
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: RequestId,
    label: String,
    token: CancellationToken,
}

impl RequestHandle {
    pub(crate) fn new(id: RequestId, label: String) -> Self {
        Self {
            id,
            label,
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// `METHOD path`，仅用于日志
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 取消请求（幂等）
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}
