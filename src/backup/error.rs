// ==========================================
// 学生档案管理 - 备份模块错误类型
// ==========================================
// 备份失败只记录日志，不中断调用方
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("数据库文件不存在: {0}")]
    SourceMissing(PathBuf),

    #[error("备份 IO 失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("备份任务异常: {0}")]
    TaskFailed(String),
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result 类型别名
pub type BackupResult<T> = Result<T, BackupError>;
