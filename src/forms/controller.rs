//! 表单状态控制器
//!
//! 持有一份表单的值、错误、触碰标记和提交状态。
//! 内部锁只在同步区段内持有，提交处理函数的等待期间不持锁。

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

pub type FormValues = Map<String, Value>;
pub type FormErrors = BTreeMap<String, String>;

/// 整表校验函数，返回字段 → 错误信息
pub type Validator = Arc<dyn Fn(&FormValues) -> FormErrors + Send + Sync>;
/// 异步提交处理函数
pub type SubmitHandler = Arc<dyn Fn(FormValues) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// 表单配置
#[derive(Clone, Default)]
pub struct FormConfig {
    pub initial_values: FormValues,
    pub validate: Option<Validator>,
    pub on_submit: Option<SubmitHandler>,
}

impl FormConfig {
    pub fn new(initial_values: FormValues) -> Self {
        Self {
            initial_values,
            validate: None,
            on_submit: None,
        }
    }

    pub fn validate(mut self, validator: impl Fn(&FormValues) -> FormErrors + Send + Sync + 'static) -> Self {
        self.validate = Some(Arc::new(validator));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_submit = Some(Arc::new(move |values: FormValues| handler(values).boxed()));
        self
    }
}

/// 表单状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FormValues,
    pub errors: FormErrors,
    pub touched: BTreeMap<String, bool>,
    pub is_submitting: bool,
    pub submit_count: u32,
}

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 校验未通过，未调用处理函数
    Invalid(FormErrors),
    /// 已有提交在进行中
    AlreadySubmitting,
    Submitted,
    /// 处理函数失败，已记录日志
    Failed(String),
}

impl SubmitOutcome {
    /// 表单是否通过了校验
    pub fn passed_validation(&self) -> bool {
        !matches!(self, SubmitOutcome::Invalid(_))
    }
}

struct FormInner {
    initial_values: FormValues,
    state: FormState,
}

/// 提交结束（包括 future 被提前丢弃）时清除 `is_submitting`
struct SubmittingGuard {
    inner: Arc<Mutex<FormInner>>,
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.state.is_submitting = false;
    }
}

/// 表单控制器
#[derive(Clone)]
pub struct FormController {
    inner: Arc<Mutex<FormInner>>,
    validate: Option<Validator>,
    on_submit: Option<SubmitHandler>,
}

/// 字符串去首尾空白，`null` 变为空字符串，其他原样保留
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        other => other,
    }
}

impl FormController {
    pub fn new(config: FormConfig) -> Self {
        let FormConfig {
            initial_values,
            validate,
            on_submit,
        } = config;
        Self {
            inner: Arc::new(Mutex::new(FormInner {
                state: FormState {
                    values: initial_values.clone(),
                    ..FormState::default()
                },
                initial_values,
            })),
            validate,
            on_submit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_validation(&self, values: &FormValues) -> FormErrors {
        match &self.validate {
            Some(validate) => validate(values),
            None => FormErrors::new(),
        }
    }

    // ========== 读取 ==========

    pub fn state(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn values(&self) -> FormValues {
        self.lock().state.values.clone()
    }

    pub fn value(&self, field: &str) -> Option<Value> {
        self.lock().state.values.get(field).cloned()
    }

    pub fn errors(&self) -> FormErrors {
        self.lock().state.errors.clone()
    }

    pub fn error(&self, field: &str) -> Option<String> {
        self.lock().state.errors.get(field).cloned()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.lock().state.touched.get(field).copied().unwrap_or(false)
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().state.is_submitting
    }

    pub fn submit_count(&self) -> u32 {
        self.lock().state.submit_count
    }

    /// 没有任何错误
    pub fn is_valid(&self) -> bool {
        self.lock().state.errors.is_empty()
    }

    /// 任一初始字段的当前值与初始值不同
    pub fn is_dirty(&self) -> bool {
        let inner = self.lock();
        inner
            .initial_values
            .iter()
            .any(|(key, initial)| inner.state.values.get(key) != Some(initial))
    }

    // ========== 输入事件 ==========

    /// 输入变化：清洗后写入并标记已触碰
    pub fn handle_change(&self, field: &str, value: Value) {
        let mut inner = self.lock();
        inner.state.values.insert(field.to_string(), sanitize_value(value));
        inner.state.touched.insert(field.to_string(), true);
    }

    /// 失焦：标记已触碰并整表校验
    pub fn handle_blur(&self, field: &str) {
        let values = {
            let mut inner = self.lock();
            inner.state.touched.insert(field.to_string(), true);
            inner.state.values.clone()
        };
        let errors = self.run_validation(&values);
        self.lock().state.errors = errors;
    }

    /// 提交
    ///
    /// 全部标记已触碰、计数加一、整表校验；
    /// 通过后调用处理函数，处理函数的失败只记录日志，不向上传播
    pub async fn handle_submit(&self) -> SubmitOutcome {
        let values = {
            let mut inner = self.lock();
            if inner.state.is_submitting {
                debug!("表单正在提交，忽略重复提交");
                return SubmitOutcome::AlreadySubmitting;
            }
            Self::touch_all_locked(&mut inner);
            inner.state.submit_count += 1;
            inner.state.values.clone()
        };

        let errors = self.run_validation(&values);
        {
            let mut inner = self.lock();
            inner.state.errors = errors.clone();
            if !errors.is_empty() {
                return SubmitOutcome::Invalid(errors);
            }
            if inner.state.is_submitting {
                return SubmitOutcome::AlreadySubmitting;
            }
            if self.on_submit.is_some() {
                inner.state.is_submitting = true;
            }
        }

        let Some(handler) = self.on_submit.clone() else {
            return SubmitOutcome::Submitted;
        };

        // future 被丢弃或处理函数 panic 时同样会复位
        let _submitting = SubmittingGuard {
            inner: Arc::clone(&self.inner),
        };
        let result = handler(values).await;

        match result {
            Ok(()) => SubmitOutcome::Submitted,
            Err(e) => {
                error!("❌ 表单提交失败: {:#}", e);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }

    // ========== 直接设置 ==========

    /// 设置单个值（清洗，不标记触碰）
    pub fn set_value(&self, field: &str, value: Value) {
        self.lock()
            .state
            .values
            .insert(field.to_string(), sanitize_value(value));
    }

    /// 批量设置值（清洗，不标记触碰）
    pub fn set_values(&self, values: FormValues) {
        let mut inner = self.lock();
        for (field, value) in values {
            inner.state.values.insert(field, sanitize_value(value));
        }
    }

    pub fn set_field_touched(&self, field: &str, touched: bool) {
        self.lock().state.touched.insert(field.to_string(), touched);
    }

    /// 把当前所有字段标记为已触碰
    pub fn touch_all(&self) {
        Self::touch_all_locked(&mut self.lock());
    }

    fn touch_all_locked(inner: &mut FormInner) {
        inner.state.touched = inner
            .state
            .values
            .keys()
            .map(|key| (key.clone(), true))
            .collect();
    }

    pub fn set_field_error(&self, field: &str, message: impl Into<String>) {
        self.lock()
            .state
            .errors
            .insert(field.to_string(), message.into());
    }

    pub fn set_errors(&self, errors: FormErrors) {
        self.lock().state.errors = errors;
    }

    /// 整表校验并写入错误
    pub fn validate_form(&self) -> FormErrors {
        let values = self.values();
        let errors = self.run_validation(&values);
        self.lock().state.errors = errors.clone();
        errors
    }

    // ========== 重置 ==========

    /// 恢复为给定值（缺省为初始值），清除错误、触碰和提交状态
    pub fn reset_form(&self, values: Option<FormValues>) {
        let mut inner = self.lock();
        let values = values.unwrap_or_else(|| inner.initial_values.clone());
        inner.state.values = values;
        inner.state.errors.clear();
        inner.state.touched.clear();
        inner.state.is_submitting = false;
    }

    /// 初始值发生结构性变化时，按新初始值重置表单；返回是否发生了重置
    pub fn set_initial_values(&self, initial_values: FormValues) -> bool {
        let mut inner = self.lock();
        if inner.initial_values == initial_values {
            return false;
        }
        inner.state = FormState {
            values: initial_values.clone(),
            ..FormState::default()
        };
        inner.initial_values = initial_values;
        true
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::required;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn values(v: Value) -> FormValues {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_sanitize_value() {
        assert_eq!(sanitize_value(json!("  hi ")), json!("hi"));
        assert_eq!(sanitize_value(Value::Null), json!(""));
        assert_eq!(sanitize_value(json!(true)), json!(true));
        assert_eq!(sanitize_value(json!(3)), json!(3));
    }

    #[test]
    fn test_change_marks_touched_and_dirty() {
        let form = FormController::new(FormConfig::new(values(json!({"name": "", "student_id": ""}))));
        assert!(!form.is_dirty());

        form.handle_change("name", json!("  Lan  "));
        assert_eq!(form.value("name"), Some(json!("Lan")));
        assert!(form.is_touched("name"));
        assert!(!form.is_touched("student_id"));
        assert!(form.is_dirty());

        form.handle_change("name", json!(""));
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_blur_validates_whole_form() {
        let form = FormController::new(
            FormConfig::new(values(json!({"name": "", "student_id": ""})))
                .validator(required(&["name", "student_id"])),
        );
        form.handle_blur("name");
        assert!(form.is_touched("name"));
        assert_eq!(form.errors().len(), 2);
        assert!(!form.is_valid());
    }

    #[tokio::test]
    async fn test_invalid_submit_never_calls_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let form = FormController::new(
            FormConfig::new(values(json!({"username": "", "password": "x"})))
                .validator(required(&["username", "password"]))
                .on_submit(move |_| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
        );

        let outcome = form.handle_submit().await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.contains_key("username")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.submit_count(), 1);
        assert!(form.is_touched("username"));
        assert!(form.is_touched("password"));
    }

    #[tokio::test]
    async fn test_failing_handler_is_swallowed() {
        let form = FormController::new(
            FormConfig::new(values(json!({"title": "Quiz"})))
                .on_submit(|_| async { Err(anyhow::anyhow!("Failed to create test")) }),
        );
        let outcome = form.handle_submit().await;
        assert_eq!(outcome, SubmitOutcome::Failed("Failed to create test".to_string()));
        assert!(!form.is_submitting());
    }

    fn slow_form(delay_ms: u64, calls: Arc<AtomicUsize>) -> FormController {
        FormController::new(FormConfig::new(values(json!({"title": "Quiz"}))).on_submit(move |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(())
            }
        }))
    }

    #[tokio::test]
    async fn test_dropped_submit_allows_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let form = slow_form(200, Arc::clone(&calls));

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), form.handle_submit()).await;
        assert!(timed_out.is_err());
        assert!(!form.is_submitting());

        assert_eq!(form.handle_submit().await, SubmitOutcome::Submitted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(form.submit_count(), 2);
    }

    #[tokio::test]
    async fn test_panicking_handler_clears_submitting() {
        let form = FormController::new(
            FormConfig::new(values(json!({"title": "Quiz"})))
                .on_submit(|values: FormValues| async move {
                    if values.contains_key("title") {
                        panic!("handler blew up");
                    }
                    Ok(())
                }),
        );

        let task = tokio::spawn({
            let form = form.clone();
            async move { form.handle_submit().await }
        });
        assert!(task.await.is_err());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_identity_change_resets_submit_count() {
        let form = FormController::new(FormConfig::new(values(json!({"title": "A"}))));
        assert_eq!(form.handle_submit().await, SubmitOutcome::Submitted);
        assert_eq!(form.submit_count(), 1);

        assert!(form.set_initial_values(values(json!({"title": "B"}))));
        assert_eq!(form.submit_count(), 0);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_reset_after_initial_values_change() {
        let form = FormController::new(FormConfig::new(values(json!({"title": "A"}))));
        form.handle_change("title", json!("B"));
        form.set_field_error("title", "bad");

        assert!(!form.set_initial_values(values(json!({"title": "A"}))));
        assert_eq!(form.value("title"), Some(json!("B")));

        assert!(form.set_initial_values(values(json!({"title": "C", "num_questions": 10}))));
        let state = form.state();
        assert_eq!(state.values, values(json!({"title": "C", "num_questions": 10})));
        assert!(state.errors.is_empty());
        assert!(state.touched.is_empty());
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_reset_form_with_explicit_values() {
        let form = FormController::new(FormConfig::new(values(json!({"name": "x"}))));
        form.touch_all();
        form.reset_form(Some(values(json!({"name": "y"}))));
        assert_eq!(form.value("name"), Some(json!("y")));
        assert!(!form.is_touched("name"));
        assert!(form.is_dirty());

        form.reset_form(None);
        assert!(!form.is_dirty());
    }
}
