// ==========================================
// 学生档案管理 - 导入/导出层
// ==========================================
// 职责: 表格文件 ↔ 学生档案
// 支持: Excel (.xlsx/.xls/.xlsm), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod student_importer;
pub mod task;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use exporter::{default_export_file_name, StudentExporter};
pub use field_mapper::StudentFieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use student_importer::StudentImporter;
pub use task::{ImportHandle, ImportProgress, ImportTask};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, NoProgress, ParsedRow, ParsedSheet, ProgressSink};
