// ==========================================
// 学生档案管理 - 学生统计视图
// ==========================================

use serde::{Deserialize, Serialize};

/// 单个学生的考勤与成绩汇总
///
/// - attendance_rate: 出勤数 / 考勤总数 × 100，总数为 0 时为 0
/// - average/highest/lowest_score: 无成绩时为 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentStatistics {
    pub student_id: i64,
    pub total_classes: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub justified_count: i64,
    pub attendance_rate: f64,
    pub total_marks: i64,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
}
