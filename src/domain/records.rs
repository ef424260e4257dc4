// ==========================================
// 学生档案管理 - 考勤/成绩/评语
// ==========================================
// 依附记录: 学生或课次删除时级联删除
// 约束: (student_id, class_id) 考勤唯一、成绩唯一；评语可多条
// ==========================================

use crate::domain::types::AttendanceStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub status: AttendanceStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    /// 分数 [0, 20]，None 表示尚未打分
    pub score: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub text: String,
    pub created_at: NaiveDateTime,
}

// ==========================================
// 聚合中间结果（仓储层输出，统计引擎输入）
// ==========================================

/// 按状态分组的考勤计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    pub present: i64,
    pub absent: i64,
    pub justified: i64,
}

impl AttendanceCounts {
    pub fn total(&self) -> i64 {
        self.present + self.absent + self.justified
    }

    pub fn add(&mut self, status: AttendanceStatus, count: i64) {
        match status {
            AttendanceStatus::Present => self.present += count,
            AttendanceStatus::Absent => self.absent += count,
            AttendanceStatus::JustifiedAbsent => self.justified += count,
        }
    }
}

/// 成绩聚合（count 含未打分记录；无分数时 avg/max/min 为 None）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkAggregates {
    pub count: i64,
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
}
