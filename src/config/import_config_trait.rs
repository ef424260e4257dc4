// ==========================================
// 学生档案管理 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/导出模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入器读取工作表优先级与列名
// 实现者: ImportConfig（AppConfig.import 节）
pub trait ImportConfigReader: Send + Sync {
    /// 工作表名优先级列表（区分大小写，精确匹配）
    ///
    /// # 默认值
    /// - ["note", "noteDataTable1", "Sheet1", "Feuil1", "notes"]
    ///
    /// # 说明
    /// - 均未命中时回退到第一个工作表
    fn sheet_name_priority(&self) -> &[String];

    /// 学号列名（必填列）
    fn matricule_column(&self) -> &str;

    /// 姓列名（必填列）
    fn last_name_column(&self) -> &str;

    /// 名列名（必填列）
    fn first_name_column(&self) -> &str;

    /// 专业列名（可选列）
    fn section_column(&self) -> &str;

    /// 分组列名（可选列）
    fn group_column(&self) -> &str;

    /// 导出工作表名
    ///
    /// # 默认值
    /// - "Students"
    fn export_sheet_name(&self) -> &str;

    /// 必填列（按报告顺序）
    fn required_columns(&self) -> Vec<&str> {
        vec![
            self.matricule_column(),
            self.last_name_column(),
            self.first_name_column(),
        ]
    }
}
