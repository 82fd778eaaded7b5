//! 业务服务共用的结果翻译
//!
//! 资源客户端已经完成失败分类，这里只负责：
//! 取消 → `FailureKind::Cancelled`，失败 → 单条可读信息，成功 → 反序列化为领域类型

use crate::error::{ApiResult, ServiceError, ServiceResult};
use crate::infrastructure::{ApiCall, RequestScope};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// 把资源客户端的结果翻译为业务结果
pub(crate) fn settle<T>(result: ApiResult<Option<T>>, fallback: &str) -> ServiceResult<T> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            debug!("调用已取消: {}", fallback);
            Err(ServiceError::cancelled(fallback))
        }
        Err(e) => {
            let translated = ServiceError::from_api(&e, fallback);
            warn!("⚠️ {} ({}): {}", fallback, e.endpoint(), translated.message());
            Err(translated)
        }
    }
}

/// 反序列化为领域类型
pub(crate) fn decode<T: DeserializeOwned>(value: JsonValue, fallback: &str) -> ServiceResult<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!("⚠️ {}: 响应结构不符合预期: {}", fallback, e);
        ServiceError::unexpected_payload(fallback)
    })
}

/// 原样返回后端数据（已拆信封）
pub(crate) async fn call_value(scope: &RequestScope, call: ApiCall) -> ServiceResult<JsonValue> {
    let fallback = call.fallback_message().to_string();
    settle(scope.run(call).await, &fallback)
}

pub(crate) async fn call_json<T: DeserializeOwned>(scope: &RequestScope, call: ApiCall) -> ServiceResult<T> {
    let fallback = call.fallback_message().to_string();
    let value = settle(scope.run(call).await, &fallback)?;
    decode(value, &fallback)
}

/// 列表接口；空响应视为空列表
///
/// 分页接口只得到当前页（见 `unwrap_envelope`）
pub(crate) async fn call_list<T: DeserializeOwned>(scope: &RequestScope, call: ApiCall) -> ServiceResult<Vec<T>> {
    let fallback = call.fallback_message().to_string();
    match settle(scope.run(call).await, &fallback)? {
        JsonValue::Null => Ok(Vec::new()),
        value => decode(value, &fallback),
    }
}

/// 只关心成败的接口（删除等）
pub(crate) async fn call_unit(scope: &RequestScope, call: ApiCall) -> ServiceResult<()> {
    call_value(scope, call).await.map(|_| ())
}
