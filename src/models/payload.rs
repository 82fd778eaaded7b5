//! 请求 / 响应载荷的通用整形

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// 拆掉后端的响应信封
///
/// - DRF 分页：`{"count": .., "results": [...]}` → `results`，
///   只返回当前页；还有下一页时记录一条 debug 日志
/// - `{"data": ...}` 单字段信封 → `data`
///
/// 其他结构原样返回
pub fn unwrap_envelope(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(mut obj) => {
            let paginated = obj.contains_key("count")
                && obj.get("results").map(JsonValue::is_array).unwrap_or(false);
            if paginated {
                if let Some(next) = obj.get("next").filter(|next| !next.is_null()) {
                    debug!(
                        "分页响应只取第一页: count={}, next={}",
                        obj.get("count").unwrap_or(&JsonValue::Null),
                        next
                    );
                }
                return obj.remove("results").unwrap_or(JsonValue::Null);
            }
            if obj.len() == 1 && obj.contains_key("data") {
                return obj.remove("data").unwrap_or(JsonValue::Null);
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

/// 删除对象中值为空字符串或 `null` 的字段（只处理顶层）
pub fn compact_object(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(obj) => {
            let kept: Map<String, JsonValue> = obj
                .into_iter()
                .filter(|(_, v)| !is_blank_value(v))
                .collect();
            JsonValue::Object(kept)
        }
        other => other,
    }
}

fn is_blank_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// serde 辅助：`Option<String>` 为空或全是空白时不序列化
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}
