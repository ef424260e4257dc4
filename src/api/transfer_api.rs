// ==========================================
// 学生档案管理 - 导入/导出/备份 API
// ==========================================
// 职责: 表格导入（同步 / 后台任务 / 文件选择）、导出、手动备份
// 约束: 涉及文件系统的操作前先检查存储目录可用
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::backup::BackupManager;
use crate::config::ImportConfig;
use crate::domain::import::{ExportSummary, ImportSummary};
use crate::importer::{
    default_export_file_name, ImportHandle, ImportTask, ProgressSink, StudentExporter,
    StudentImporter,
};
use crate::platform::{FileSelection, FileSelector, StorageAccessor};

pub struct TransferApi {
    importer: Arc<StudentImporter<ImportConfig>>,
    exporter: Arc<StudentExporter<ImportConfig>>,
    backup_manager: Arc<BackupManager>,
    storage: Arc<dyn StorageAccessor>,
    export_dir: PathBuf,
}

impl TransferApi {
    /// 创建新的 TransferApi 实例
    ///
    /// # 参数
    /// - export_dir: 默认导出目录
    pub fn new(
        importer: Arc<StudentImporter<ImportConfig>>,
        exporter: Arc<StudentExporter<ImportConfig>>,
        backup_manager: Arc<BackupManager>,
        storage: Arc<dyn StorageAccessor>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            importer,
            exporter,
            backup_manager,
            storage,
            export_dir,
        }
    }

    fn ensure_storage(&self) -> ApiResult<()> {
        self.storage.ensure_access().map_err(|e| {
            warn!(error = %e, "存储目录不可用");
            ApiError::IoError(e.to_string())
        })
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 同步导入
    pub fn import_file(
        &self,
        path: &Path,
        group_override: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> ApiResult<ImportSummary> {
        self.ensure_storage()?;
        Ok(self
            .importer
            .import_from_spreadsheet(path, group_override, progress)?)
    }

    /// 后台导入（返回进度/完成句柄）
    pub fn import_in_background(
        &self,
        path: PathBuf,
        group_override: Option<String>,
    ) -> ApiResult<ImportHandle> {
        self.ensure_storage()?;
        Ok(ImportTask::spawn(self.importer.clone(), path, group_override)?)
    }

    /// 通过文件选择能力导入
    ///
    /// # 返回
    /// - Err(Cancelled): 用户取消选择
    pub fn import_selected(
        &self,
        selector: &dyn FileSelector,
        group_override: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> ApiResult<ImportSummary> {
        match selector.select_spreadsheet() {
            FileSelection::Selected(path) => self.import_file(&path, group_override, progress),
            FileSelection::Cancelled => {
                info!("文件选择已取消");
                Err(ApiError::Cancelled)
            }
        }
    }

    // ==========================================
    // 导出
    // ==========================================

    pub fn export_file(&self, output: &Path, group: Option<&str>) -> ApiResult<ExportSummary> {
        self.ensure_storage()?;
        Ok(self.exporter.export_to_spreadsheet(output, group)?)
    }

    /// 导出到默认目录: <exports>/export_<分组>_<时间戳>.xlsx
    pub fn export_default(&self, group: Option<&str>) -> ApiResult<ExportSummary> {
        let file_name = default_export_file_name(group, Local::now().naive_local());
        let output = self.export_dir.join(file_name);
        self.export_file(&output, group)
    }

    // ==========================================
    // 备份
    // ==========================================

    pub fn backup_now(&self) -> ApiResult<PathBuf> {
        self.ensure_storage()?;
        Ok(self.backup_manager.backup()?)
    }

    pub fn list_backups(&self) -> ApiResult<Vec<PathBuf>> {
        Ok(self.backup_manager.list_backups()?)
    }
}
