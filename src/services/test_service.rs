/// 试卷服务
///
/// 试卷增删查、答案设置、答题卡 PDF 预览
use crate::error::ServiceResult;
use crate::infrastructure::{ApiCall, ApiClient, RequestScope};
use crate::models::{normalize_answer_keys, ExamTest, NewTest, TestSummary};
use crate::services::support;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;

const TESTS: &str = "api/tests/";

/// 试卷服务
#[derive(Clone, Debug)]
pub struct TestService {
    scope: RequestScope,
}

impl TestService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub async fn get_all_tests(&self) -> ServiceResult<Vec<ExamTest>> {
        support::call_list(&self.scope, ApiCall::get(TESTS).fallback("Failed to fetch tests")).await
    }

    pub async fn get_test_summary(&self) -> ServiceResult<Vec<TestSummary>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}test_summary/", TESTS)).fallback("Failed to fetch test summary"),
        )
        .await
    }

    pub async fn get_test(&self, test_id: i64) -> ServiceResult<ExamTest> {
        support::call_json(
            &self.scope,
            ApiCall::get(format!("{}{}/", TESTS, test_id)).fallback("Failed to fetch test details"),
        )
        .await
    }

    pub async fn create_test(&self, test: &NewTest) -> ServiceResult<ExamTest> {
        info!("📄 创建试卷: {} ({} 题)", test.title, test.num_questions);
        support::call_json(
            &self.scope,
            ApiCall::post(TESTS).json(test).fallback("Failed to create test"),
        )
        .await
    }

    pub async fn delete_test(&self, test_id: i64) -> ServiceResult<()> {
        info!("🗑️ 删除试卷: {}", test_id);
        support::call_unit(
            &self.scope,
            ApiCall::delete(format!("{}{}/", TESTS, test_id)).fallback("Failed to delete test"),
        )
        .await
    }

    /// 保存答案
    ///
    /// 题号转为字符串、答案转为大写，空答案不发送
    pub async fn save_answer_keys<K, V, I>(&self, test_id: i64, answers: I) -> ServiceResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: AsRef<str>,
    {
        let answer_keys = normalize_answer_keys(answers);
        info!("🔑 试卷 {} 保存 {} 个答案", test_id, answer_keys.len());
        support::call_value(
            &self.scope,
            ApiCall::post(format!("{}{}/save_answer_keys/", TESTS, test_id))
                .json_value(json!({ "answer_keys": answer_keys }))
                .fallback("Failed to save answer keys"),
        )
        .await
    }

    /// 读取答案（题号 → 答案）
    pub async fn get_answer_keys(&self, test_id: i64) -> ServiceResult<BTreeMap<String, String>> {
        let fallback = "Failed to fetch answer keys";
        let value = support::call_value(
            &self.scope,
            ApiCall::get(format!("{}{}/get_answer_keys/", TESTS, test_id)).fallback(fallback),
        )
        .await?;

        // 兼容 `{"answer_keys": {...}}` 与直接返回映射两种结构
        let keys = match value {
            Value::Object(mut obj) if obj.contains_key("answer_keys") => {
                obj.remove("answer_keys").unwrap_or(Value::Null)
            }
            Value::Null => return Ok(BTreeMap::new()),
            other => other,
        };
        let keys: BTreeMap<String, Value> = support::decode(keys, fallback)?;
        Ok(keys
            .into_iter()
            .filter_map(|(q, a)| match a {
                Value::String(s) => Some((q, s)),
                Value::Null => None,
                other => Some((q, other.to_string())),
            })
            .collect())
    }

    /// 生成答题卡 PDF 预览，返回 PDF 字节
    pub async fn preview_test_pdf(&self, test: &NewTest) -> ServiceResult<Vec<u8>> {
        let fallback = "Failed to generate PDF preview";
        let call = ApiCall::post(format!("{}preview_test_pdf/", TESTS))
            .json(test)
            .fallback(fallback);
        support::settle(self.scope.run_bytes(call).await, fallback)
    }
}
