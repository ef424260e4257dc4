// ==========================================
// 学生档案管理 - 应用状态
// ==========================================
// 职责: 由 AppConfig 装配仓储、引擎、导入导出、备份与 API
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{StudentApi, TransferApi};
use crate::backup::{AutoBackupHandle, AutoBackupScheduler, BackupManager};
use crate::config::AppConfig;
use crate::db::init_database;
use crate::engine::StatisticsAggregator;
use crate::importer::{StudentExporter, StudentImporter};
use crate::platform::{DesktopStorage, StorageAccessor};
use crate::repository::{
    AttendanceRepository, ClassSessionRepository, CommentRepository, MarkRepository,
    StudentRepository,
};
use crate::validation::FieldValidator;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 生效配置
    pub config: AppConfig,

    /// 数据库路径
    pub db_path: PathBuf,

    /// 学生API
    pub student_api: Arc<StudentApi>,

    /// 导入/导出/备份API
    pub transfer_api: Arc<TransferApi>,

    /// 备份管理器（自动备份复用）
    pub backup_manager: Arc<BackupManager>,

    /// 存储能力
    pub storage: Arc<dyn StorageAccessor>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 确认存储目录可用
    /// 2. 初始化数据库 schema（幂等）
    /// 3. 初始化所有Repository与Engine
    /// 4. 创建所有API实例
    ///
    /// # 返回
    /// - Err(String): 初始化错误
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let db_path = config.storage.db_path();
        tracing::info!("初始化AppState，数据库路径: {}", db_path.display());

        let storage: Arc<dyn StorageAccessor> =
            Arc::new(DesktopStorage::new(&config.storage.storage_root));
        storage
            .ensure_access()
            .map_err(|e| format!("存储目录不可用: {}", e))?;

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("无法创建数据库目录: {}", e))?;
        }
        init_database(&db_path).map_err(|e| format!("数据库初始化失败: {}", e))?;

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let validator = FieldValidator::new(&config.validation);
        let student_repo = Arc::new(StudentRepository::new(&db_path, validator.clone()));
        let class_repo = Arc::new(ClassSessionRepository::new(&db_path));
        let attendance_repo = Arc::new(AttendanceRepository::new(&db_path));
        let mark_repo = Arc::new(MarkRepository::new(&db_path, validator));
        let comment_repo = Arc::new(CommentRepository::new(&db_path));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let statistics = Arc::new(StatisticsAggregator::new(
            student_repo.clone(),
            attendance_repo.clone(),
            mark_repo.clone(),
        ));

        // ==========================================
        // 导入/导出/备份
        // ==========================================
        let importer = Arc::new(StudentImporter::new(
            student_repo.clone(),
            config.import.clone(),
        ));
        let exporter = Arc::new(StudentExporter::new(
            student_repo.clone(),
            config.import.clone(),
        ));
        let backup_manager = Arc::new(BackupManager::new(&db_path, config.storage.backup_dir()));

        // ==========================================
        // 创建API实例
        // ==========================================
        let student_api = Arc::new(StudentApi::new(
            student_repo,
            class_repo,
            attendance_repo,
            mark_repo,
            comment_repo,
            statistics,
            config.pagination.page_size,
        ));
        let transfer_api = Arc::new(TransferApi::new(
            importer,
            exporter,
            backup_manager.clone(),
            storage.clone(),
            config.storage.export_dir(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            db_path,
            student_api,
            transfer_api,
            backup_manager,
            storage,
        })
    }

    /// 按配置启动自动备份（需在 tokio 运行时内调用）
    ///
    /// 配置关闭自动备份时返回 None
    pub fn start_auto_backup(&self) -> Option<AutoBackupHandle> {
        let backup = &self.config.backup;
        if !backup.auto_backup {
            tracing::info!("自动备份已关闭");
            return None;
        }
        Some(AutoBackupScheduler::spawn(
            self.backup_manager.clone(),
            Duration::from_secs(backup.interval_secs),
            backup.backup_on_shutdown,
        ))
    }
}
