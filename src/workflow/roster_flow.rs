//! 班级名单维护流程：增删学生后重新拉取名单

use crate::error::ServiceResult;
use crate::models::{NewStudent, Student};
use crate::services::ClassroomService;
use tracing::info;

/// 增加学生后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RosterUpdate {
    pub student: Student,
    pub roster: Vec<Student>,
}

#[derive(Clone, Debug)]
pub struct RosterFlow {
    classrooms: ClassroomService,
}

impl RosterFlow {
    pub fn new(classrooms: ClassroomService) -> Self {
        Self { classrooms }
    }

    pub async fn add_student_and_refresh(&self, student: &NewStudent) -> ServiceResult<RosterUpdate> {
        let created = self.classrooms.add_student(student).await?;
        let roster = self.classrooms.get_students(student.classroom).await?;
        info!("🔄 班级 {} 名单已刷新，共 {} 人", student.classroom, roster.len());
        Ok(RosterUpdate {
            student: created,
            roster,
        })
    }

    pub async fn remove_student_and_refresh(&self, classroom_id: i64, student_id: i64) -> ServiceResult<Vec<Student>> {
        self.classrooms.delete_student(student_id).await?;
        let roster = self.classrooms.get_students(classroom_id).await?;
        info!("🔄 班级 {} 名单已刷新，共 {} 人", classroom_id, roster.len());
        Ok(roster)
    }
}
