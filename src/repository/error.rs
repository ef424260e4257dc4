// ==========================================
// 学生档案管理 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 校验 / 唯一约束 / 未找到 / 外键 / 存储
// ==========================================

use crate::validation::ValidationFailure;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据校验错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 约束错误 =====
    #[error("唯一约束违反: {0}")]
    DuplicateKey(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 存储错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库操作失败: {0}")]
    StorageError(String),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 错误类别码（与 API 层错误码一致）
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::ValidationError(_) => "VALIDATION_ERROR",
            RepositoryError::DuplicateKey(_) => "DUPLICATE_KEY",
            RepositoryError::ForeignKeyViolation(_) | RepositoryError::NotFound { .. } => {
                "NOT_FOUND"
            }
            RepositoryError::DatabaseConnectionError(_) | RepositoryError::StorageError(_) => {
                "STORAGE_ERROR"
            }
        }
    }

    /// 不带类别前缀的错误详情
    pub fn detail(&self) -> String {
        match self {
            RepositoryError::ValidationError(msg)
            | RepositoryError::DuplicateKey(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::StorageError(msg) => msg.clone(),
            RepositoryError::NotFound { entity, id } => format!("{} with id {} not found", entity, id),
        }
    }
}

impl From<ValidationFailure> for RepositoryError {
    fn from(err: ValidationFailure) -> Self {
        RepositoryError::ValidationError(err.reason)
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let msg = msg.unwrap_or_else(|| code.to_string());
                if msg.contains("UNIQUE") {
                    RepositoryError::DuplicateKey(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK") {
                    RepositoryError::ValidationError(msg)
                } else if code.code == rusqlite::ErrorCode::CannotOpen {
                    RepositoryError::DatabaseConnectionError(msg)
                } else {
                    RepositoryError::StorageError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::StorageError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
