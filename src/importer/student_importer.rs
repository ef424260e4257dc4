// ==========================================
// 学生档案管理 - 学生导入器
// ==========================================
// 导入流程:
// 1. 文件存在性检查
// 2. 文件解析（工作表选择）
// 3. 必填列检查（缺列时不写入任何行）
// 4. 逐行映射 + add_student，行级错误计数不中断
// 5. 每行完成后上报进度
// 6. 汇总消息
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{ImportSummary, RowError};
use crate::domain::student::NewStudent;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::StudentFieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, ParsedSheet, ProgressSink};
use crate::perf::PerfGuard;
use crate::repository::StudentRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// StudentImporter - 学生导入器
// ==========================================
pub struct StudentImporter<C>
where
    C: ImportConfigReader,
{
    students: Arc<StudentRepository>,
    config: C,
    parser: Box<dyn FileParser>,
}

impl<C> StudentImporter<C>
where
    C: ImportConfigReader,
{
    /// 创建新的导入器实例（按扩展名选择解析器）
    pub fn new(students: Arc<StudentRepository>, config: C) -> Self {
        let parser = UniversalFileParser::new(config.sheet_name_priority().to_vec());
        Self::with_parser(students, config, Box::new(parser))
    }

    /// 指定解析器
    pub fn with_parser(
        students: Arc<StudentRepository>,
        config: C,
        parser: Box<dyn FileParser>,
    ) -> Self {
        Self {
            students,
            config,
            parser,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 从表格文件导入学生
    ///
    /// # 参数
    /// - file_path: .xlsx/.xls/.xlsm/.csv 文件
    /// - group_override: 非空时所有行使用此分组
    /// - progress: 每处理一行上报 (index + 1) / total
    ///
    /// # 返回
    /// - Ok(ImportSummary): 行级错误已计入 errors
    /// - Err(FileNotFound / UnsupportedFormat / *ParseError): 文件无法读取
    /// - Err(SchemaError): 缺少必填列，未写入任何行
    #[instrument(skip(self, file_path, progress), fields(file = %file_path.display()))]
    pub fn import_from_spreadsheet(
        &self,
        file_path: &Path,
        group_override: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> ImportResult<ImportSummary> {
        let _perf = PerfGuard::new("import_students");
        info!("开始导入学生数据");

        // 步骤 1-2: 解析文件
        let sheet = self.parser.parse(file_path)?;
        info!(sheet = %sheet.sheet_name, total_rows = sheet.rows.len(), "文件解析完成");

        // 步骤 3: 必填列检查
        self.check_required_columns(&sheet)?;

        // 步骤 4-5: 逐行导入
        let mapper = StudentFieldMapper::new(&self.config, &sheet);
        let total = sheet.rows.len();
        let mut added = 0usize;
        let mut row_errors = Vec::new();

        for (idx, row) in sheet.rows.iter().enumerate() {
            let record = mapper.map_row(row, group_override);
            let student = NewStudent {
                matricule: record.matricule.clone(),
                last_name: record.last_name,
                first_name: record.first_name,
                section: record.section,
                group: record.group,
            };

            match self.students.add_student(&student) {
                Ok(id) => {
                    debug!(row_number = record.row_number, student_id = id, "行导入成功");
                    added += 1;
                }
                Err(e) => {
                    warn!(
                        row_number = record.row_number,
                        matricule = %record.matricule,
                        code = e.code(),
                        error = %e,
                        "行导入失败"
                    );
                    row_errors.push(RowError {
                        row_number: record.row_number,
                        matricule: Some(record.matricule).filter(|m| !m.is_empty()),
                        code: e.code().to_string(),
                        reason: e.detail(),
                    });
                }
            }

            progress.report((idx + 1) as f64 / total as f64);
        }

        // 步骤 6: 汇总
        let errors = row_errors.len();
        let message = ImportSummary::summary_message(added, errors);
        info!(added, errors, "{}", message);

        Ok(ImportSummary {
            sheet_name: sheet.sheet_name,
            total_rows: total,
            added,
            errors,
            row_errors,
            message,
        })
    }

    /// 检查必填列，返回全部缺失列
    fn check_required_columns(&self, sheet: &ParsedSheet) -> ImportResult<()> {
        let missing: Vec<String> = self
            .config
            .required_columns()
            .into_iter()
            .filter(|col| !sheet.has_column(col))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            warn!(missing = ?missing, "缺少必填列，导入中止");
            return Err(ImportError::SchemaError { missing });
        }
        Ok(())
    }
}
