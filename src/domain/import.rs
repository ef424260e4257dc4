// ==========================================
// 学生档案管理 - 导入/导出中间结构
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ==========================================
// RawStudentRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构 → add_student
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStudentRecord {
    pub matricule: String,
    pub last_name: String,
    pub first_name: String,
    pub section: Option<String>,
    pub group: Option<String>,

    // 元信息
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
}

/// 单行导入失败记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub matricule: Option<String>,
    pub code: String, // DUPLICATE_KEY / VALIDATION_ERROR / STORAGE_ERROR ...
    pub reason: String,
}

// ==========================================
// ImportSummary - 导入结果
// ==========================================
// 行级错误不会中断批次，只计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub sheet_name: String,
    pub total_rows: usize,
    pub added: usize,
    pub errors: usize,
    pub row_errors: Vec<RowError>,
    pub message: String,
}

impl ImportSummary {
    /// 生成汇总消息: "Import complete: N students added[, M errors]"
    pub fn summary_message(added: usize, errors: usize) -> String {
        let mut message = format!("Import complete: {} students added", added);
        if errors > 0 {
            message.push_str(&format!(", {} errors", errors));
        }
        message
    }
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}
