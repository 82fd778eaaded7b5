use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// 单选 / 多选
    #[serde(rename = "MC")]
    MultipleChoice,
    /// 扩展判断
    #[serde(rename = "TFE")]
    TrueFalseExtended,
    /// 排序
    #[serde(rename = "ORD")]
    Ordering,
    /// 填空
    #[serde(rename = "FIB")]
    FillInBlank,
}

impl QuestionKind {
    /// 后端题型代码
    pub fn code(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "MC",
            QuestionKind::TrueFalseExtended => "TFE",
            QuestionKind::Ordering => "ORD",
            QuestionKind::FillInBlank => "FIB",
        }
    }

    /// 从代码解析题型
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "MC" => Some(QuestionKind::MultipleChoice),
            "TFE" => Some(QuestionKind::TrueFalseExtended),
            "ORD" => Some(QuestionKind::Ordering),
            "FIB" => Some(QuestionKind::FillInBlank),
            _ => None,
        }
    }
}

/// 科目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 章
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub subject: Option<i64>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub chapter: Option<i64>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 题库中的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankQuestion {
    pub id: i64,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub section: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl BankQuestion {
    pub fn kind(&self) -> Option<QuestionKind> {
        self.question_type.as_deref().and_then(QuestionKind::from_code)
    }
}

/// 创建 / 修改科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectInput {
    pub name: String,
}

/// 创建 / 修改章
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterInput {
    pub name: String,
    pub subject: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// 创建 / 修改节
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionInput {
    pub name: String,
    pub chapter: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// 题目列表筛选条件，未设置的条件不发送
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub subject_id: Option<i64>,
    pub chapter_id: Option<i64>,
    pub section_id: Option<i64>,
    pub question_type: Option<QuestionKind>,
    pub search: Option<String>,
}

impl QuestionFilter {
    /// 转为查询参数
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.subject_id {
            pairs.push(("subject_id", id.to_string()));
        }
        if let Some(id) = self.chapter_id {
            pairs.push(("chapter_id", id.to_string()));
        }
        if let Some(id) = self.section_id {
            pairs.push(("section_id", id.to_string()));
        }
        if let Some(kind) = self.question_type {
            pairs.push(("question_type", kind.code().to_string()));
        }
        if let Some(search) = self.search.as_deref() {
            if !search.trim().is_empty() {
                pairs.push(("search", search.trim().to_string()));
            }
        }
        pairs
    }
}
