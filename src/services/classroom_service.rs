/// 班级服务
///
/// 班级与班级学生名单
use crate::error::ServiceResult;
use crate::infrastructure::{ApiCall, ApiClient, RequestScope};
use crate::models::{Classroom, NewClassroom, NewStudent, Student};
use crate::services::support;
use tracing::info;

/// 班级服务
#[derive(Clone, Debug)]
pub struct ClassroomService {
    scope: RequestScope,
}

impl ClassroomService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub async fn get_all_classrooms(&self) -> ServiceResult<Vec<Classroom>> {
        support::call_list(
            &self.scope,
            ApiCall::get("classroom/").fallback("Failed to fetch classrooms"),
        )
        .await
    }

    pub async fn get_classroom(&self, classroom_id: i64) -> ServiceResult<Classroom> {
        support::call_json(
            &self.scope,
            ApiCall::get(format!("classroom/{}/", classroom_id)).fallback("Failed to fetch classroom"),
        )
        .await
    }

    pub async fn create_classroom(&self, classroom: &NewClassroom) -> ServiceResult<Classroom> {
        info!("🏫 创建班级: {}", classroom.name);
        support::call_json(
            &self.scope,
            ApiCall::post("classroom/")
                .json(classroom)
                .fallback("Failed to create classroom"),
        )
        .await
    }

    pub async fn delete_classroom(&self, classroom_id: i64) -> ServiceResult<()> {
        info!("🗑️ 删除班级: {}", classroom_id);
        support::call_unit(
            &self.scope,
            ApiCall::delete(format!("classroom/{}/", classroom_id)).fallback("Failed to delete classroom"),
        )
        .await
    }

    /// 班级学生名单
    pub async fn get_students(&self, classroom_id: i64) -> ServiceResult<Vec<Student>> {
        support::call_list(
            &self.scope,
            ApiCall::get(format!("classroom/{}/students/", classroom_id)).fallback("Failed to fetch students"),
        )
        .await
    }

    /// 添加学生，班级编号放在请求体里
    pub async fn add_student(&self, student: &NewStudent) -> ServiceResult<Student> {
        info!("👤 班级 {} 添加学生: {}", student.classroom, student.name);
        support::call_json(
            &self.scope,
            ApiCall::post("classroom/students/")
                .json(student)
                .fallback("Failed to add student"),
        )
        .await
    }

    pub async fn delete_student(&self, student_id: i64) -> ServiceResult<()> {
        info!("🗑️ 删除学生: {}", student_id);
        support::call_unit(
            &self.scope,
            ApiCall::delete(format!("classroom/students/{}/", student_id)).fallback("Failed to delete student"),
        )
        .await
    }
}
