// ==========================================
// 学生档案管理 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod class_session;
pub mod import;
pub mod records;
pub mod statistics;
pub mod student;
pub mod types;

// 重导出核心类型
pub use class_session::{ClassSession, NewClassSession};
pub use import::{ExportSummary, ImportSummary, RawStudentRecord, RowError};
pub use records::{AttendanceCounts, AttendanceRecord, Comment, Mark, MarkAggregates};
pub use statistics::StudentStatistics;
pub use student::{NewStudent, Student, StudentPage, StudentQuery, DEFAULT_PAGE_SIZE};
pub use types::AttendanceStatus;
