// ==========================================
// 学生档案管理 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm) / CSV (.csv)
// 工作表选择: 优先级列表中第一个存在的（精确匹配），否则第一个工作表
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, ParsedRow, ParsedSheet};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "xlsm"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// 组装一行；完全空白的行返回 None
fn build_row<I>(headers: &[String], values: I, row_number: usize) -> Option<ParsedRow>
where
    I: Iterator<Item = String>,
{
    let mut cells = HashMap::new();
    for (col_idx, value) in values.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            cells.insert(header.clone(), value.trim().to_string());
        }
    }

    if cells.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(ParsedRow { row_number, cells })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let values = record.iter().map(str::to_string);
            if let Some(row) = build_row(&headers, values, idx + 1) {
                rows.push(row);
            }
        }

        let sheet_name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        debug!(sheet = %sheet_name, rows = rows.len(), "CSV 解析完成");

        Ok(ParsedSheet {
            sheet_name,
            headers,
            rows,
        })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    sheet_priority: Vec<String>,
}

impl ExcelParser {
    pub fn new(sheet_priority: Vec<String>) -> Self {
        Self { sheet_priority }
    }

    /// 按优先级选择工作表
    pub fn select_sheet(&self, sheet_names: &[String]) -> Option<String> {
        self.sheet_priority
            .iter()
            .find(|candidate| sheet_names.contains(candidate))
            .or_else(|| sheet_names.first())
            .cloned()
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_name = self
            .select_sheet(&workbook.sheet_names())
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        debug!(sheet = %sheet_name, "读取工作表");

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut range_rows = range.rows();
        let headers: Vec<String> = match range_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell_to_string(cell).trim().to_string())
                .collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in range_rows.enumerate() {
            let values = data_row.iter().map(cell_to_string);
            if let Some(row) = build_row(&headers, values, idx + 1) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet {
            sheet_name,
            headers,
            rows,
        })
    }
}

/// 单元格转文本
///
/// 整数值浮点不带 ".0"（学号常以数字存储）
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    excel: ExcelParser,
    csv: CsvParser,
}

impl UniversalFileParser {
    pub fn new(sheet_priority: Vec<String>) -> Self {
        Self {
            excel: ExcelParser::new(sheet_priority),
            csv: CsvParser,
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => self.csv.parse(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => self.excel.parse(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn priority() -> Vec<String> {
        ["note", "noteDataTable1", "Sheet1", "Feuil1", "notes"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_sheet_priority_order() {
        let parser = ExcelParser::new(priority());
        assert_eq!(
            parser.select_sheet(&names(&["Data", "Feuil1", "Sheet1"])),
            Some("Sheet1".to_string())
        );
    }

    #[test]
    fn test_select_sheet_is_case_sensitive_and_falls_back() {
        let parser = ExcelParser::new(priority());
        assert_eq!(
            parser.select_sheet(&names(&["Roster", "NOTE"])),
            Some("Roster".to_string())
        );
        assert_eq!(parser.select_sheet(&[]), None);
    }

    #[test]
    fn test_cell_to_string_numeric_identifier() {
        assert_eq!(cell_to_string(&Data::Float(123456789012.0)), "123456789012");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_csv_parser_skips_blank_rows() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Matricule,Nom,Prénom").unwrap();
        writeln!(temp_file, "123456789012, Doe ,Jane").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "123456789013,Roe,John").unwrap();
        temp_file.flush().unwrap();

        let sheet = CsvParser.parse(temp_file.path()).unwrap();
        assert_eq!(sheet.headers, names(&["Matricule", "Nom", "Prénom"]));
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].cells.get("Nom").map(String::as_str), Some("Doe"));
        assert_eq!(sheet.rows[1].row_number, 3);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = UniversalFileParser::new(priority())
            .parse(temp_file.path())
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_missing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().with_extension("xlsx");
        let err = UniversalFileParser::new(priority()).parse(&path).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}
