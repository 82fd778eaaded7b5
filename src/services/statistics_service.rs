/// 统计服务（只读，返回结构由后端决定）
use crate::error::ServiceResult;
use crate::infrastructure::{ApiCall, ApiClient, RequestScope};
use crate::services::support;
use serde_json::Value;

const STATISTICS: &str = "api/statistics/";

#[derive(Clone, Debug)]
pub struct StatisticsService {
    scope: RequestScope,
}

impl StatisticsService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub async fn get_top_students(&self) -> ServiceResult<Value> {
        support::call_value(
            &self.scope,
            ApiCall::get(format!("{}top-students/", STATISTICS)).fallback("Failed to fetch top students"),
        )
        .await
    }

    pub async fn get_test_statistics(&self) -> ServiceResult<Value> {
        support::call_value(
            &self.scope,
            ApiCall::get(format!("{}test-statistics/", STATISTICS)).fallback("Failed to fetch test statistics"),
        )
        .await
    }

    pub async fn get_test_question_stats(&self, test_id: i64) -> ServiceResult<Value> {
        support::call_value(
            &self.scope,
            ApiCall::get(format!("{}{}/test-question-stats/", STATISTICS, test_id))
                .fallback("Failed to fetch question statistics"),
        )
        .await
    }
}
