//! 可复用的表单校验函数

use crate::forms::controller::{FormErrors, FormValues, Validator};
use serde_json::Value;
use std::sync::Arc;

/// 字段名转为提示用的标签：`student_id` → `Student id`
fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// 检查必填字段，返回缺失字段的错误
pub fn check_required(values: &FormValues, fields: &[&str]) -> FormErrors {
    fields
        .iter()
        .filter(|field| is_missing(values.get(**field)))
        .map(|field| (field.to_string(), format!("{} is required", label(field))))
        .collect()
}

/// 必填字段校验器
pub fn required(fields: &[&str]) -> Validator {
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    Arc::new(move |values: &FormValues| {
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        check_required(values, &names)
    })
}

/// 登录表单：用户名和密码必填
pub fn login_validator() -> Validator {
    required(&["username", "password"])
}
