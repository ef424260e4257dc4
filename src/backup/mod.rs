// ==========================================
// 学生档案管理 - 备份层
// ==========================================
// 职责: 数据库文件定时/手动/退出时备份
// ==========================================

pub mod error;
pub mod manager;
pub mod scheduler;

pub use error::{BackupError, BackupResult};
pub use manager::{backup_file_name, BackupManager};
pub use scheduler::{AutoBackupHandle, AutoBackupScheduler};
