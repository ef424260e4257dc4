// ==========================================
// 学生档案管理 - 配置层
// ==========================================
// 职责: 应用配置对象的加载/校验，按组件分节
// ==========================================

pub mod app_config;
pub mod import_config_trait;

// 重导出核心配置类型
pub use app_config::{
    default_storage_root, AppConfig, BackupConfig, ConfigError, ConfigResult, ImportConfig,
    PaginationConfig, StorageConfig, ValidationConfig,
};
pub use import_config_trait::ImportConfigReader;
