/// 题库服务
///
/// 科目 → 章 → 节 → 题目 四级结构的增删改查，以及题目批量导入
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::{ApiCall, ApiClient, MultipartForm, RequestScope};
use crate::models::{
    BankQuestion, Chapter, ChapterInput, QuestionFilter, QuestionKind, Section, SectionInput, Subject, SubjectInput,
};
use crate::services::support;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

const BASE: &str = "api/question-bank/";

fn collection(resource: &str) -> String {
    format!("{}{}/", BASE, resource)
}

fn item(resource: &str, id: i64) -> String {
    format!("{}{}/{}/", BASE, resource, id)
}

/// 题库服务
#[derive(Clone, Debug)]
pub struct QuestionBankService {
    scope: RequestScope,
}

impl QuestionBankService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    // ========== 科目 ==========

    pub async fn get_all_subjects(&self) -> ServiceResult<Vec<Subject>> {
        support::call_list(
            &self.scope,
            ApiCall::get(collection("subjects")).fallback("Failed to fetch subjects"),
        )
        .await
    }

    pub async fn create_subject(&self, subject: &SubjectInput) -> ServiceResult<Subject> {
        info!("📚 创建科目: {}", subject.name);
        support::call_json(
            &self.scope,
            ApiCall::post(collection("subjects"))
                .json(subject)
                .fallback("Failed to create subject"),
        )
        .await
    }

    pub async fn update_subject(&self, subject_id: i64, subject: &SubjectInput) -> ServiceResult<Subject> {
        support::call_json(
            &self.scope,
            ApiCall::put(item("subjects", subject_id))
                .json(subject)
                .fallback("Failed to update subject"),
        )
        .await
    }

    pub async fn delete_subject(&self, subject_id: i64) -> ServiceResult<()> {
        support::call_unit(
            &self.scope,
            ApiCall::delete(item("subjects", subject_id)).fallback("Failed to delete subject"),
        )
        .await
    }

    pub async fn get_subject_chapters(&self, subject_id: i64) -> ServiceResult<Vec<Chapter>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}chapters/", item("subjects", subject_id))).fallback("Failed to fetch chapters"),
        )
        .await
    }

    // ========== 章 ==========

    /// 章列表，可按科目筛选
    pub async fn get_all_chapters(&self, subject_id: Option<i64>) -> ServiceResult<Vec<Chapter>> {
        let mut call = ApiCall::get(collection("chapters")).fallback("Failed to fetch chapters");
        if let Some(subject_id) = subject_id {
            call = call.query("subject_id", subject_id);
        }
        support::call_list(&self.scope, call).await
    }

    pub async fn create_chapter(&self, chapter: &ChapterInput) -> ServiceResult<Chapter> {
        info!("📚 创建章: {} (科目 {})", chapter.name, chapter.subject);
        support::call_json(
            &self.scope,
            ApiCall::post(collection("chapters"))
                .json(chapter)
                .fallback("Failed to create chapter"),
        )
        .await
    }

    pub async fn update_chapter(&self, chapter_id: i64, chapter: &ChapterInput) -> ServiceResult<Chapter> {
        support::call_json(
            &self.scope,
            ApiCall::put(item("chapters", chapter_id))
                .json(chapter)
                .fallback("Failed to update chapter"),
        )
        .await
    }

    pub async fn delete_chapter(&self, chapter_id: i64) -> ServiceResult<()> {
        support::call_unit(
            &self.scope,
            ApiCall::delete(item("chapters", chapter_id)).fallback("Failed to delete chapter"),
        )
        .await
    }

    pub async fn get_chapter_sections(&self, chapter_id: i64) -> ServiceResult<Vec<Section>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}sections/", item("chapters", chapter_id))).fallback("Failed to fetch sections"),
        )
        .await
    }

    // ========== 节 ==========

    /// 节列表，可按章筛选
    pub async fn get_all_sections(&self, chapter_id: Option<i64>) -> ServiceResult<Vec<Section>> {
        let mut call = ApiCall::get(collection("sections")).fallback("Failed to fetch sections");
        if let Some(chapter_id) = chapter_id {
            call = call.query("chapter_id", chapter_id);
        }
        support::call_list(&self.scope, call).await
    }

    pub async fn create_section(&self, section: &SectionInput) -> ServiceResult<Section> {
        info!("📚 创建节: {} (章 {})", section.name, section.chapter);
        support::call_json(
            &self.scope,
            ApiCall::post(collection("sections"))
                .json(section)
                .fallback("Failed to create section"),
        )
        .await
    }

    pub async fn update_section(&self, section_id: i64, section: &SectionInput) -> ServiceResult<Section> {
        support::call_json(
            &self.scope,
            ApiCall::put(item("sections", section_id))
                .json(section)
                .fallback("Failed to update section"),
        )
        .await
    }

    pub async fn delete_section(&self, section_id: i64) -> ServiceResult<()> {
        support::call_unit(
            &self.scope,
            ApiCall::delete(item("sections", section_id)).fallback("Failed to delete section"),
        )
        .await
    }

    pub async fn get_section_questions(&self, section_id: i64) -> ServiceResult<Vec<BankQuestion>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}questions/", item("sections", section_id))).fallback("Failed to fetch questions"),
        )
        .await
    }

    // ========== 题目 ==========

    pub async fn get_all_questions(&self, filter: &QuestionFilter) -> ServiceResult<Vec<BankQuestion>> {
        let call = filter
            .to_query()
            .into_iter()
            .fold(ApiCall::get(collection("questions")), |call, (key, value)| call.query(key, value))
            .fallback("Failed to fetch questions");
        support::call_list(&self.scope, call).await
    }

    pub async fn get_question_details(&self, question_id: i64) -> ServiceResult<BankQuestion> {
        support::call_json(
            &self.scope,
            ApiCall::get(item("questions", question_id)).fallback("Failed to fetch question details"),
        )
        .await
    }

    /// 创建题目；题目结构随题型变化，由调用方组装
    pub async fn create_question(&self, question: &Value) -> ServiceResult<BankQuestion> {
        support::call_json(
            &self.scope,
            ApiCall::post(collection("questions"))
                .json_value(question.clone())
                .fallback("Failed to create question"),
        )
        .await
    }

    pub async fn update_question(&self, question_id: i64, question: &Value) -> ServiceResult<BankQuestion> {
        support::call_json(
            &self.scope,
            ApiCall::put(item("questions", question_id))
                .json_value(question.clone())
                .fallback("Failed to update question"),
        )
        .await
    }

    pub async fn delete_question(&self, question_id: i64) -> ServiceResult<()> {
        support::call_unit(
            &self.scope,
            ApiCall::delete(item("questions", question_id)).fallback("Failed to delete question"),
        )
        .await
    }

    pub async fn duplicate_question(&self, question_id: i64) -> ServiceResult<BankQuestion> {
        support::call_json(
            &self.scope,
            ApiCall::post(format!("{}duplicate/", item("questions", question_id)))
                .fallback("Failed to duplicate question"),
        )
        .await
    }

    pub async fn get_questions_by_type(&self, kind: QuestionKind) -> ServiceResult<Vec<BankQuestion>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("{}by-type/", collection("questions")))
                .query("type", kind.code())
                .fallback("Failed to fetch questions"),
        )
        .await
    }

    /// 从文件批量导入题目到指定节
    pub async fn upload_questions(&self, section_id: i64, file: &Path) -> ServiceResult<Value> {
        let fallback = "Failed to upload questions";
        info!("📥 导入题目: {} → 节 {}", file.display(), section_id);

        let form = MultipartForm::new()
            .text("section_id", section_id.to_string())
            .file_from_path("file", file)
            .await
            .map_err(|e| {
                warn!("⚠️ 无法读取题目文件 {}: {}", file.display(), e);
                ServiceError::setup(e)
            })?;

        support::call_value(
            &self.scope,
            ApiCall::post(format!("{}upload-questions/", collection("questions")))
                .multipart(form)
                .fallback(fallback),
        )
        .await
    }
}
