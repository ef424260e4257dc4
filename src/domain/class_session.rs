// ==========================================
// 学生档案管理 - 课次领域模型
// ==========================================
// 对齐: classes 表
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ClassSession - 课次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: i64,
    pub course_name: String,          // 课程名（必填）
    pub subject_name: Option<String>, // 科目
    pub date: NaiveDate,              // 上课日期
    pub group: Option<String>,        // 分组
    pub created_at: NaiveDateTime,
}

// ==========================================
// NewClassSession - 课次创建输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClassSession {
    pub course_name: String,
    pub subject_name: Option<String>,
    pub date: NaiveDate,
    pub group: Option<String>,
}

impl NewClassSession {
    pub fn new(course_name: &str, date: NaiveDate) -> Self {
        Self {
            course_name: course_name.to_string(),
            subject_name: None,
            date,
            group: None,
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject_name = Some(subject.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}
