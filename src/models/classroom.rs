use crate::models::payload::is_blank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 班级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 任课教师用户名
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 学生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    /// 学号
    pub student_id: String,
    #[serde(default)]
    pub classroom: Option<i64>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 创建班级
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewClassroom {
    pub name: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
}

/// 向班级添加学生
///
/// 提供密码或出生日期时后端会同时为学生创建登录账号
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub classroom: i64,
    pub name: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub password: Option<String>,
}

impl NewStudent {
    pub fn new(classroom: i64, name: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            classroom,
            name: name.into(),
            student_id: student_id.into(),
            date_of_birth: None,
            password: None,
        }
    }
}
