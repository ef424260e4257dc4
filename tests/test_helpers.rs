// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时存储目录下的 AppState、学生样例数据、表格夹具
// ==========================================

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::Path;
use student_tracker::app::AppState;
use student_tracker::config::AppConfig;
use student_tracker::domain::NewStudent;
use tempfile::TempDir;

/// 测试环境（TempDir 需保持存活）
pub struct TestEnv {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestEnv {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// 测试配置：存储根目录指向临时目录，关闭自动备份
pub fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::with_storage_root(root);
    config.backup.auto_backup = false;
    config.pagination.page_size = 5;
    config
}

/// 创建临时目录并装配 AppState
pub fn create_test_env() -> Result<TestEnv, Box<dyn Error>> {
    let dir = TempDir::new()?;
    let state = AppState::new(test_config(dir.path()))?;
    Ok(TestEnv { dir, state })
}

/// 第 n 个样例学号（12 位数字）
pub fn matricule(n: u32) -> String {
    format!("{:012}", 202400000000u64 + n as u64)
}

/// 样例学生
pub fn sample_student(n: u32, group: &str) -> NewStudent {
    NewStudent::new(&matricule(n), &format!("Nom{:02}", n), &format!("Prenom{:02}", n))
        .with_section("Informatique")
        .with_group(group)
}

/// 写入名单表格（工作表名 note，全部按文本写入）
pub fn write_roster_xlsx(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("note")?;
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string((r + 1) as u32, col as u16, value.as_str())?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// 标准列头
pub fn roster_headers() -> Vec<&'static str> {
    vec!["Matricule", "Nom", "Prénom", "Section", "Groupe"]
}

/// 标准名单行
pub fn roster_row(n: u32, group: &str) -> Vec<String> {
    vec![
        matricule(n),
        format!("Nom{:02}", n),
        format!("Prenom{:02}", n),
        "Informatique".to_string(),
        group.to_string(),
    ]
}
