// ==========================================
// 学生档案管理 - 领域类型定义
// ==========================================
// 考勤状态三态: 出勤 / 缺勤 / 请假(有理由缺勤)
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 考勤状态 (Attendance Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    #[default]
    Present,         // 出勤
    Absent,          // 缺勤
    JustifiedAbsent, // 有理由缺勤
}

impl AttendanceStatus {
    /// 数据库存储值
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::JustifiedAbsent => "JUSTIFIED_ABSENT",
        }
    }

    /// 全部状态（按统计口径顺序）
    pub fn all() -> [AttendanceStatus; 3] {
        [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::JustifiedAbsent,
        ]
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRESENT" => Ok(AttendanceStatus::Present),
            "ABSENT" => Ok(AttendanceStatus::Absent),
            "JUSTIFIED_ABSENT" => Ok(AttendanceStatus::JustifiedAbsent),
            other => Err(format!("未知考勤状态: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_status_db_roundtrip() {
        for status in AttendanceStatus::all() {
            let parsed: AttendanceStatus = status.as_db_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_attendance_status_parse_is_case_insensitive() {
        assert_eq!(
            "justified_absent".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::JustifiedAbsent
        );
        assert!("LATE".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_attendance_status_default_is_present() {
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Present);
    }
}
