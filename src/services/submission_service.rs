/// 答题卡提交服务
///
/// 上传扫描件（带进度）、提交摘要、明细、按学生查询成绩
use crate::error::ServiceResult;
use crate::infrastructure::{ApiCall, ApiClient, MultipartForm, ProgressCallback, RequestScope};
use crate::models::{StudentResult, SubmissionSummary, SubmissionUpload, UploadReceipt};
use crate::services::support;
use serde_json::Value;
use tracing::info;

const SUBMISSIONS: &str = "api/submissions/";

/// 答题卡提交服务
#[derive(Clone, Debug)]
pub struct SubmissionService {
    scope: RequestScope,
}

impl SubmissionService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    /// 上传答题卡扫描件
    ///
    /// # 参数
    /// - `upload`: 试卷编号、可选学生编号与图片
    /// - `on_progress`: 上传进度回调（0-100，单调不减，成功时以 100 结束）
    ///
    /// # 返回
    /// 后端受理回执，评分异步进行
    pub async fn upload_submission(
        &self,
        upload: SubmissionUpload,
        on_progress: Option<ProgressCallback>,
    ) -> ServiceResult<UploadReceipt> {
        info!(
            "📤 上传答题卡: 试卷 {}，文件 {} ({} 字节)",
            upload.test_id,
            upload.file_name,
            upload.image.len()
        );

        let mut form = MultipartForm::new().text("test_id", upload.test_id.to_string());
        if let Some(student_id) = upload.student_id {
            form = form.text("student_id", student_id.to_string());
        }
        let form = form.file("submission_image", upload.file_name, upload.mime, upload.image);

        let mut call = ApiCall::post(format!("{}upload_submission/", SUBMISSIONS))
            .multipart(form)
            .fallback("Failed to upload submission");
        if let Some(callback) = on_progress {
            call = call.on_progress_arc(callback);
        }

        let receipt: UploadReceipt = support::call_json(&self.scope, call).await?;
        info!("✅ 答题卡已受理: 提交编号 {}", receipt.submission_id);
        Ok(receipt)
    }

    /// 提交摘要，可按试卷、学生筛选
    pub async fn get_submission_summary(
        &self,
        test_id: Option<i64>,
        student_id: Option<i64>,
    ) -> ServiceResult<Vec<SubmissionSummary>> {
        let mut call = ApiCall::get(format!("{}submission_summary/", SUBMISSIONS))
            .fallback("Failed to fetch submission summary");
        if let Some(test_id) = test_id {
            call = call.query("test_id", test_id);
        }
        if let Some(student_id) = student_id {
            call = call.query("student_id", student_id);
        }
        support::call_list(&self.scope, call).await
    }

    /// 单次提交的批改明细（结构由后端决定）
    pub async fn get_submission_details(&self, submission_id: i64) -> ServiceResult<Value> {
        support::call_value(
            &self.scope,
            ApiCall::get(format!("{}{}/detail/", SUBMISSIONS, submission_id))
                .fallback("Failed to fetch submission details"),
        )
        .await
    }

    pub async fn delete_submission(&self, submission_id: i64) -> ServiceResult<()> {
        info!("🗑️ 删除提交: {}", submission_id);
        support::call_unit(
            &self.scope,
            ApiCall::delete(format!("{}{}/", SUBMISSIONS, submission_id))
                .fallback("Failed to delete submission"),
        )
        .await
    }

    /// 按姓名和班级查询学生成绩
    pub async fn get_student_details(&self, name: &str, class_name: &str) -> ServiceResult<Vec<StudentResult>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}student_details/", SUBMISSIONS))
                .query("name", name.trim())
                .query("class", class_name.trim())
                .fallback("Failed to fetch student details"),
        )
        .await
    }
}
