// ==========================================
// 学生档案管理 - 导入管道 Trait
// ==========================================
// 职责: 定义文件解析与进度上报接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// ParsedSheet - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub sheet_name: String,
    pub headers: Vec<String>, // 表头（已 trim）
    pub rows: Vec<ParsedRow>, // 数据行（不含完全空白的行）
}

impl ParsedSheet {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRow {
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
    pub cells: HashMap<String, String>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 行
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat / ExcelParseError / CsvParseError)
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet>;
}

// ==========================================
// ProgressSink Trait
// ==========================================
// 用途: 导入进度上报，值域 (0, 1]
// 实现者: 闭包、后台任务通道
pub trait ProgressSink {
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64),
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// 不上报进度
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}
