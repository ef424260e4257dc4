// ==========================================
// 学生档案管理 - 字段映射器实现
// ==========================================
// 职责: 表格行 → RawStudentRecord
// 规则: 所有文本 trim；可选列缺失或为空 → None；分组可被覆盖
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::RawStudentRecord;
use crate::importer::importer_trait::{ParsedRow, ParsedSheet};
use std::collections::HashMap;

pub struct StudentFieldMapper {
    matricule_column: String,
    last_name_column: String,
    first_name_column: String,
    section_column: Option<String>, // 表头中不存在时为 None
    group_column: Option<String>,
}

impl StudentFieldMapper {
    /// 根据配置与实际表头构造映射器
    pub fn new(config: &dyn ImportConfigReader, sheet: &ParsedSheet) -> Self {
        let optional = |name: &str| {
            if sheet.has_column(name) {
                Some(name.to_string())
            } else {
                None
            }
        };

        Self {
            matricule_column: config.matricule_column().to_string(),
            last_name_column: config.last_name_column().to_string(),
            first_name_column: config.first_name_column().to_string(),
            section_column: optional(config.section_column()),
            group_column: optional(config.group_column()),
        }
    }

    /// 映射单行
    ///
    /// # 参数
    /// - group_override: 非空时覆盖行内分组
    pub fn map_row(&self, row: &ParsedRow, group_override: Option<&str>) -> RawStudentRecord {
        let group = match group_override.map(str::trim).filter(|g| !g.is_empty()) {
            Some(group) => Some(group.to_string()),
            None => self
                .group_column
                .as_deref()
                .and_then(|col| self.get_string(&row.cells, col)),
        };

        RawStudentRecord {
            matricule: self.get_text(&row.cells, &self.matricule_column),
            last_name: self.get_text(&row.cells, &self.last_name_column),
            first_name: self.get_text(&row.cells, &self.first_name_column),
            section: self
                .section_column
                .as_deref()
                .and_then(|col| self.get_string(&row.cells, col)),
            group,
            row_number: row.row_number,
        }
    }

    /// 提取字符串字段（空值返回 None）
    fn get_string(&self, cells: &HashMap<String, String>, key: &str) -> Option<String> {
        cells
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 提取必填文本字段（缺失时为空串，交给校验层报告）
    fn get_text(&self, cells: &HashMap<String, String>, key: &str) -> String {
        self.get_string(cells, key).unwrap_or_default()
    }
}
