// ==========================================
// 学生档案管理 - 学生 API
// ==========================================
// 职责: 学生档案 CRUD、课次/考勤/成绩/评语、统计
// 错误: 仓储错误统一转换为 ApiError
// ==========================================

use std::sync::Arc;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::class_session::{ClassSession, NewClassSession};
use crate::domain::records::{AttendanceRecord, Comment, Mark};
use crate::domain::statistics::StudentStatistics;
use crate::domain::student::{NewStudent, Student, StudentPage, StudentQuery};
use crate::domain::types::AttendanceStatus;
use crate::engine::StatisticsAggregator;
use crate::repository::{
    AttendanceRepository, ClassSessionRepository, CommentRepository, MarkRepository,
    StudentRepository,
};

// ==========================================
// StudentApi - 学生 API
// ==========================================
pub struct StudentApi {
    student_repo: Arc<StudentRepository>,
    class_repo: Arc<ClassSessionRepository>,
    attendance_repo: Arc<AttendanceRepository>,
    mark_repo: Arc<MarkRepository>,
    comment_repo: Arc<CommentRepository>,
    statistics: Arc<StatisticsAggregator>,
    page_size: i64,
}

impl StudentApi {
    /// 创建新的 StudentApi 实例
    ///
    /// # 参数
    /// - page_size: 分页查询默认每页条数
    pub fn new(
        student_repo: Arc<StudentRepository>,
        class_repo: Arc<ClassSessionRepository>,
        attendance_repo: Arc<AttendanceRepository>,
        mark_repo: Arc<MarkRepository>,
        comment_repo: Arc<CommentRepository>,
        statistics: Arc<StatisticsAggregator>,
        page_size: i64,
    ) -> Self {
        Self {
            student_repo,
            class_repo,
            attendance_repo,
            mark_repo,
            comment_repo,
            statistics,
            page_size,
        }
    }

    // ==========================================
    // 学生档案
    // ==========================================

    pub fn add_student(&self, student: &NewStudent) -> ApiResult<i64> {
        Ok(self.student_repo.add_student(student)?)
    }

    pub fn list_students(&self, query: &StudentQuery) -> ApiResult<StudentPage> {
        debug!(?query, "查询学生列表");
        Ok(self.student_repo.list_students(query)?)
    }

    /// 按页码查询（页码从 0 开始，每页条数取配置值）
    ///
    /// # 返回
    /// - Err(ValidationError): 页码换算的偏移量溢出
    pub fn list_page(
        &self,
        group: Option<&str>,
        search_term: Option<&str>,
        page: i64,
    ) -> ApiResult<StudentPage> {
        let offset = page.max(0).checked_mul(self.page_size).ok_or_else(|| {
            ApiError::ValidationError(format!("Page number {} is out of range", page))
        })?;

        let mut query = StudentQuery::default().page(offset, self.page_size);
        if let Some(group) = group {
            query = query.in_group(group);
        }
        if let Some(term) = search_term {
            query = query.search(term);
        }
        self.list_students(&query)
    }

    /// 按 id 获取学生（不存在时 NotFound）
    pub fn get_student(&self, id: i64) -> ApiResult<Student> {
        self.student_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Student with id {} not found", id)))
    }

    pub fn find_by_matricule(&self, matricule: &str) -> ApiResult<Option<Student>> {
        Ok(self.student_repo.find_by_matricule(matricule)?)
    }

    pub fn update_student(&self, id: i64, student: &NewStudent) -> ApiResult<()> {
        Ok(self.student_repo.update_student(id, student)?)
    }

    pub fn delete_student(&self, id: i64) -> ApiResult<()> {
        Ok(self.student_repo.delete_student(id)?)
    }

    pub fn list_groups(&self) -> ApiResult<Vec<String>> {
        Ok(self.student_repo.list_groups()?)
    }

    pub fn count_students(&self) -> ApiResult<i64> {
        Ok(self.student_repo.count_students()?)
    }

    pub fn student_statistics(&self, student_id: i64) -> ApiResult<StudentStatistics> {
        Ok(self.statistics.student_statistics(student_id)?)
    }

    // ==========================================
    // 课次
    // ==========================================

    pub fn create_class(&self, session: &NewClassSession) -> ApiResult<i64> {
        Ok(self.class_repo.create(session)?)
    }

    pub fn list_classes(&self, group: Option<&str>) -> ApiResult<Vec<ClassSession>> {
        Ok(self.class_repo.list(group)?)
    }

    pub fn delete_class(&self, class_id: i64) -> ApiResult<()> {
        Ok(self.class_repo.delete(class_id)?)
    }

    // ==========================================
    // 考勤 / 成绩 / 评语
    // ==========================================

    pub fn record_attendance(
        &self,
        student_id: i64,
        class_id: i64,
        status: AttendanceStatus,
    ) -> ApiResult<i64> {
        Ok(self.attendance_repo.record(student_id, class_id, status)?)
    }

    pub fn attendance_for_student(&self, student_id: i64) -> ApiResult<Vec<AttendanceRecord>> {
        Ok(self.attendance_repo.list_for_student(student_id)?)
    }

    pub fn set_mark(&self, student_id: i64, class_id: i64, score: Option<f64>) -> ApiResult<i64> {
        Ok(self.mark_repo.set_score(student_id, class_id, score)?)
    }

    /// 文本分数（表单输入）
    pub fn set_mark_text(&self, student_id: i64, class_id: i64, raw: &str) -> ApiResult<i64> {
        Ok(self.mark_repo.set_score_text(student_id, class_id, raw)?)
    }

    pub fn marks_for_student(&self, student_id: i64) -> ApiResult<Vec<Mark>> {
        Ok(self.mark_repo.list_for_student(student_id)?)
    }

    pub fn add_comment(&self, student_id: i64, class_id: i64, text: &str) -> ApiResult<i64> {
        Ok(self.comment_repo.add(student_id, class_id, text)?)
    }

    pub fn comments_for_student(&self, student_id: i64) -> ApiResult<Vec<Comment>> {
        Ok(self.comment_repo.list_for_student(student_id)?)
    }

    pub fn comments_for_class(&self, student_id: i64, class_id: i64) -> ApiResult<Vec<Comment>> {
        Ok(self.comment_repo.list_for_pair(student_id, class_id)?)
    }

    pub fn delete_comment(&self, comment_id: i64) -> ApiResult<()> {
        Ok(self.comment_repo.delete(comment_id)?)
    }
}
