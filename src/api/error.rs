// ==========================================
// 学生档案管理 - API层错误类型
// ==========================================
// 职责: 将仓储/导入/备份错误转换为面向用户的错误
// 规则: 可恢复错误（校验/重复/未找到/缺列/文件）返回具体原因
//       存储/IO 错误记录详情后返回通用提示
// ==========================================

use crate::backup::BackupError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// 面向用户的通用错误提示
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected storage error occurred. See logs for details.";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 用户可恢复错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("记录重复: {0}")]
    DuplicateKey(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("缺少必填列: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}")]
    UnsupportedFormat(String),

    #[error("用户取消了文件选择")]
    Cancelled,

    // ==========================================
    // 存储/IO 错误
    // ==========================================
    #[error("数据库错误: {0}")]
    StorageError(String),

    #[error("IO 错误: {0}")]
    IoError(String),
}

impl ApiError {
    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::DuplicateKey(_) => "DUPLICATE_KEY",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::SchemaError { .. } => "SCHEMA_ERROR",
            ApiError::FileNotFound(_) => "FILE_NOT_FOUND",
            ApiError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ApiError::Cancelled => "CANCELLED",
            ApiError::StorageError(_) => "STORAGE_ERROR",
            ApiError::IoError(_) => "IO_ERROR",
        }
    }

    /// 是否可由用户修正后重试
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::ValidationError(_)
                | ApiError::DuplicateKey(_)
                | ApiError::NotFound(_)
                | ApiError::SchemaError { .. }
                | ApiError::FileNotFound(_)
                | ApiError::UnsupportedFormat(_)
                | ApiError::Cancelled
        )
    }

    /// 面向用户的提示
    ///
    /// 不可恢复错误先以 error! 记录详情，再返回通用提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationError(msg)
            | ApiError::DuplicateKey(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::SchemaError { missing } => {
                format!("Missing required columns: {}", missing.join(", "))
            }
            ApiError::FileNotFound(path) => format!("File not found: {}", path),
            ApiError::UnsupportedFormat(ext) => format!("Unsupported file format: {}", ext),
            ApiError::Cancelled => "File selection cancelled".to_string(),
            ApiError::StorageError(detail) | ApiError::IoError(detail) => {
                error!(code = self.code(), detail = %detail, "操作失败");
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// 转换为可序列化的错误响应
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.user_message(),
            details: match self {
                ApiError::SchemaError { missing } => {
                    Some(serde_json::json!({ "missing_columns": missing }))
                }
                _ => None,
            },
        }
    }
}

/// 错误响应（CLI JSON 输出 / 外部界面）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::DuplicateKey(msg) => ApiError::DuplicateKey(msg),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id {} not found", entity, id))
            }
            RepositoryError::ForeignKeyViolation(_) => {
                ApiError::NotFound("Referenced student or class does not exist".to_string())
            }
            RepositoryError::DatabaseConnectionError(msg) | RepositoryError::StorageError(msg) => {
                ApiError::StorageError(msg)
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::FileNotFound(path),
            ImportError::UnsupportedFormat(ext) => ApiError::UnsupportedFormat(ext),
            ImportError::SchemaError { missing } => ApiError::SchemaError { missing },
            ImportError::Repository(e) => e.into(),
            other @ (ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)
            | ImportError::ExportError(_)
            | ImportError::TaskError(_)) => ApiError::IoError(other.to_string()),
        }
    }
}

// ==========================================
// 从 BackupError 转换
// ==========================================
impl From<BackupError> for ApiError {
    fn from(err: BackupError) -> Self {
        ApiError::IoError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::IoError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
