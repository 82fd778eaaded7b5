use crate::models::payload::is_blank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// 试卷（答题卡测验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamTest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_questions: Option<u32>,
    #[serde(default)]
    pub num_choices: Option<u32>,
    #[serde(default)]
    pub allow_multiple_answers: Option<bool>,
    #[serde(default)]
    pub classroom: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 试卷概览（列表页使用，带提交统计）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub classroom_name: Option<String>,
    #[serde(default)]
    pub submission_count: Option<u32>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 创建试卷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTest {
    pub title: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    pub num_questions: u32,
    pub num_choices: u32,
    pub allow_multiple_answers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<i64>,
}

impl NewTest {
    pub fn new(title: impl Into<String>, num_questions: u32, num_choices: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            num_questions,
            num_choices,
            allow_multiple_answers: false,
            classroom: None,
        }
    }
}

/// 提交记录摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: i64,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub submission_image: Option<String>,
    #[serde(default)]
    pub test_id: Option<i64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 按学生查询的成绩明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    #[serde(default)]
    pub student_name: Option<String>,
    /// 学号
    #[serde(default)]
    pub mssv: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub submission_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 上传答题卡后的回执（评分在后端异步进行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub submission_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 答题卡上传
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionUpload {
    pub test_id: i64,
    pub student_id: Option<i64>,
    pub file_name: String,
    pub mime: String,
    pub image: Vec<u8>,
}

impl SubmissionUpload {
    pub fn new(test_id: i64, file_name: impl Into<String>, mime: impl Into<String>, image: Vec<u8>) -> Self {
        Self {
            test_id,
            student_id: None,
            file_name: file_name.into(),
            mime: mime.into(),
            image,
        }
    }

    pub fn for_student(mut self, student_id: i64) -> Self {
        self.student_id = Some(student_id);
        self
    }
}

/// 整理答案：键转为字符串，值转为大写，空答案丢弃
pub fn normalize_answer_keys<K, V, I>(answers: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: ToString,
    V: AsRef<str>,
{
    answers
        .into_iter()
        .filter_map(|(question, answer)| {
            let answer = answer.as_ref().trim();
            if answer.is_empty() {
                None
            } else {
                Some((question.to_string(), answer.to_uppercase()))
            }
        })
        .collect()
}
