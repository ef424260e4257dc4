// ==========================================
// 学生档案管理 - 导入/导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 行级错误不走此类型（计入 ImportSummary.row_errors）
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入/导出模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.xlsm/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("Missing required columns: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    // ===== 导出错误 =====
    #[error("Excel 写出失败: {0}")]
    ExportError(String),

    // ===== 后台任务错误 =====
    #[error("导入任务异常: {0}")]
    TaskError(String),

    // ===== 仓储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_every_missing_column() {
        let err = ImportError::SchemaError {
            missing: vec!["Nom".to_string(), "Prénom".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required columns: Nom, Prénom");
    }
}
