// ==========================================
// 学生档案管理 - 学生导出器
// ==========================================
// 输出: 单工作表 xlsx，列标题与导入列名一致，可直接再导入
// 列: 学号, 姓, 名, 专业, 分组, id, created_at, updated_at
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::ExportSummary;
use crate::domain::student::Student;
use crate::importer::error::ImportResult;
use crate::perf::PerfGuard;
use crate::repository::StudentRepository;
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 默认导出文件名: export_<分组>_<YYYYMMDD_HHMMSS>.xlsx
///
/// 未指定分组时使用 "all"；分组中的路径分隔符替换为 '_'
pub fn default_export_file_name(group: Option<&str>, now: NaiveDateTime) -> String {
    let group = group
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or("all");
    let safe_group: String = group
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    format!("export_{}_{}.xlsx", safe_group, now.format("%Y%m%d_%H%M%S"))
}

// ==========================================
// StudentExporter - 学生导出器
// ==========================================
pub struct StudentExporter<C>
where
    C: ImportConfigReader,
{
    students: Arc<StudentRepository>,
    config: C,
}

impl<C> StudentExporter<C>
where
    C: ImportConfigReader,
{
    pub fn new(students: Arc<StudentRepository>, config: C) -> Self {
        Self { students, config }
    }

    /// 导出学生到 xlsx
    ///
    /// # 参数
    /// - output: 目标文件（已存在则覆盖，父目录不存在则创建）
    /// - group: 分组过滤，None 导出全部
    #[instrument(skip(self, output), fields(output = %output.display()))]
    pub fn export_to_spreadsheet(
        &self,
        output: &Path,
        group: Option<&str>,
    ) -> ImportResult<ExportSummary> {
        let _perf = PerfGuard::new("export_students");

        let students = self.students.list_for_export(group)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.config.export_sheet_name())?;
        self.write_header(worksheet)?;

        for (idx, student) in students.iter().enumerate() {
            write_student(worksheet, (idx + 1) as u32, student)?;
        }

        workbook.save(output)?;

        info!(rows = students.len(), "学生导出完成");
        Ok(ExportSummary {
            path: output.to_path_buf(),
            rows: students.len(),
        })
    }

    fn write_header(&self, worksheet: &mut Worksheet) -> ImportResult<()> {
        let bold = Format::new().set_bold();
        let titles = [
            self.config.matricule_column(),
            self.config.last_name_column(),
            self.config.first_name_column(),
            self.config.section_column(),
            self.config.group_column(),
            "id",
            "created_at",
            "updated_at",
        ];
        for (col, title) in titles.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        Ok(())
    }
}

fn write_student(worksheet: &mut Worksheet, row: u32, student: &Student) -> ImportResult<()> {
    // 学号按文本写出，保留前导零
    worksheet.write_string(row, 0, student.matricule.as_str())?;
    worksheet.write_string(row, 1, student.last_name.as_str())?;
    worksheet.write_string(row, 2, student.first_name.as_str())?;
    if let Some(section) = &student.section {
        worksheet.write_string(row, 3, section.as_str())?;
    }
    if let Some(group) = &student.group {
        worksheet.write_string(row, 4, group.as_str())?;
    }
    worksheet.write_number(row, 5, student.id as f64)?;
    worksheet.write_string(row, 6, student.created_at.format(TIMESTAMP_FORMAT).to_string())?;
    worksheet.write_string(row, 7, student.updated_at.format(TIMESTAMP_FORMAT).to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_default_export_file_name() {
        assert_eq!(
            default_export_file_name(Some("G1"), at(9, 5, 7)),
            "export_G1_20240601_090507.xlsx"
        );
    }

    #[test]
    fn test_default_export_file_name_without_group() {
        assert_eq!(
            default_export_file_name(None, at(23, 59, 59)),
            "export_all_20240601_235959.xlsx"
        );
        assert_eq!(
            default_export_file_name(Some("  "), at(0, 0, 0)),
            "export_all_20240601_000000.xlsx"
        );
    }

    #[test]
    fn test_default_export_file_name_sanitizes_group() {
        assert_eq!(
            default_export_file_name(Some("L1/A"), at(10, 0, 0)),
            "export_L1_A_20240601_100000.xlsx"
        );
    }
}
