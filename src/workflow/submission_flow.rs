//! 答题卡上传流程
//!
//! 上传成功后重新拉取同一试卷的提交摘要，调用方拿到的就是最新列表

use crate::error::ServiceResult;
use crate::infrastructure::ProgressCallback;
use crate::models::{SubmissionSummary, SubmissionUpload, UploadReceipt};
use crate::services::SubmissionService;
use tracing::info;

/// 上传并刷新后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub receipt: UploadReceipt,
    pub summary: Vec<SubmissionSummary>,
}

#[derive(Clone, Debug)]
pub struct SubmissionFlow {
    submissions: SubmissionService,
}

impl SubmissionFlow {
    pub fn new(submissions: SubmissionService) -> Self {
        Self { submissions }
    }

    /// 上传答题卡，然后刷新该试卷的提交摘要
    pub async fn upload_and_refresh(
        &self,
        upload: SubmissionUpload,
        on_progress: Option<ProgressCallback>,
    ) -> ServiceResult<UploadOutcome> {
        let test_id = upload.test_id;
        let receipt = self.submissions.upload_submission(upload, on_progress).await?;

        let summary = self.submissions.get_submission_summary(Some(test_id), None).await?;
        info!("🔄 试卷 {} 提交摘要已刷新，共 {} 条", test_id, summary.len());

        Ok(UploadOutcome { receipt, summary })
    }
}
