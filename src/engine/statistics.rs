// ==========================================
// 学生档案管理 - 学生统计引擎
// ==========================================
// 职责: 汇总单个学生的考勤与成绩
// 输入: 仓储层的考勤计数 + 成绩聚合
// 输出: StudentStatistics
// 红线: Engine 不拼 SQL
// ==========================================

use crate::domain::records::{AttendanceCounts, MarkAggregates};
use crate::domain::statistics::StudentStatistics;
use crate::repository::{
    AttendanceRepository, MarkRepository, RepositoryError, RepositoryResult, StudentRepository,
};
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// StatisticsAggregator - 统计汇总
// ==========================================
pub struct StatisticsAggregator {
    students: Arc<StudentRepository>,
    attendance: Arc<AttendanceRepository>,
    marks: Arc<MarkRepository>,
}

impl StatisticsAggregator {
    pub fn new(
        students: Arc<StudentRepository>,
        attendance: Arc<AttendanceRepository>,
        marks: Arc<MarkRepository>,
    ) -> Self {
        Self {
            students,
            attendance,
            marks,
        }
    }

    /// 查询学生统计
    ///
    /// # 返回
    /// - Err(NotFound): 学生不存在
    #[instrument(skip(self))]
    pub fn student_statistics(&self, student_id: i64) -> RepositoryResult<StudentStatistics> {
        if self.students.find_by_id(student_id)?.is_none() {
            return Err(RepositoryError::not_found("Student", student_id));
        }

        let counts = self.attendance.status_counts(student_id)?;
        let aggregates = self.marks.aggregates(student_id)?;
        Ok(Self::compose(student_id, &counts, &aggregates))
    }

    /// 由计数与聚合组装统计结果（纯函数）
    ///
    /// - 出勤率 = 出勤 / 总数 × 100，总数为 0 时为 0
    /// - 平均分保留两位小数；无成绩时各项为 0
    pub fn compose(
        student_id: i64,
        counts: &AttendanceCounts,
        aggregates: &MarkAggregates,
    ) -> StudentStatistics {
        let total = counts.total();
        let attendance_rate = if total > 0 {
            counts.present as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        StudentStatistics {
            student_id,
            total_classes: total,
            present_count: counts.present,
            absent_count: counts.absent,
            justified_count: counts.justified,
            attendance_rate,
            total_marks: aggregates.count,
            average_score: aggregates.average.map(round2).unwrap_or(0.0),
            highest_score: aggregates.highest.unwrap_or(0.0),
            lowest_score: aggregates.lowest.unwrap_or(0.0),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
