// ==========================================
// 学生档案管理 - 应用配置
// ==========================================
// 职责: 显式构造的配置对象，启动时创建后传给各组件（无全局单例）
// 加载顺序: 默认值 → JSON 配置文件 → 环境变量覆写
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 数据库路径环境变量（便于调试/测试/CI）
pub const ENV_DB_PATH: &str = "STUDENT_TRACKER_DB_PATH";

/// 分数存储范围（与 marks 表 CHECK 约束一致）
pub const SCORE_FLOOR: f64 = 0.0;
pub const SCORE_CEILING: f64 = 20.0;

/// 存储根目录环境变量
pub const ENV_STORAGE_ROOT: &str = "STUDENT_TRACKER_STORAGE_ROOT";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// AppConfig - 应用配置根对象
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
    pub import: ImportConfig,
    pub backup: BackupConfig,
    pub pagination: PaginationConfig,
}

// ===== 存储 =====
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 应用数据根目录（数据库、备份、导出都在其下）
    pub storage_root: PathBuf,
    /// 数据库文件名
    pub db_file_name: String,
    /// 显式数据库路径（优先于 storage_root/db_file_name）
    pub db_path: Option<PathBuf>,
    /// 备份子目录名
    pub backup_dir_name: String,
    /// 导出子目录名
    pub export_dir_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            db_file_name: "student_tracker.db".to_string(),
            db_path: None,
            backup_dir_name: "backups".to_string(),
            export_dir_name: "exports".to_string(),
        }
    }
}

impl StorageConfig {
    /// 以指定根目录构造（测试/嵌入场景）
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        Self {
            storage_root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.storage_root.join(&self.db_file_name))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.storage_root.join(&self.backup_dir_name)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.storage_root.join(&self.export_dir_name)
    }
}

// ===== 校验 =====
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// 学号固定长度
    pub matricule_length: usize,
    pub min_score: f64,
    pub max_score: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            matricule_length: 12,
            min_score: 0.0,
            max_score: 20.0,
        }
    }
}

// ===== 导入/导出 =====
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub sheet_names: Vec<String>,
    pub matricule_column: String,
    pub last_name_column: String,
    pub first_name_column: String,
    pub section_column: String,
    pub group_column: String,
    pub export_sheet_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sheet_names: ["note", "noteDataTable1", "Sheet1", "Feuil1", "notes"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            matricule_column: "Matricule".to_string(),
            last_name_column: "Nom".to_string(),
            first_name_column: "Prénom".to_string(),
            section_column: "Section".to_string(),
            group_column: "Groupe".to_string(),
            export_sheet_name: "Students".to_string(),
        }
    }
}

impl ImportConfigReader for ImportConfig {
    fn sheet_name_priority(&self) -> &[String] {
        &self.sheet_names
    }

    fn matricule_column(&self) -> &str {
        &self.matricule_column
    }

    fn last_name_column(&self) -> &str {
        &self.last_name_column
    }

    fn first_name_column(&self) -> &str {
        &self.first_name_column
    }

    fn section_column(&self) -> &str {
        &self.section_column
    }

    fn group_column(&self) -> &str {
        &self.group_column
    }

    fn export_sheet_name(&self) -> &str {
        &self.export_sheet_name
    }
}

// ===== 备份 =====
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// 自动备份开关
    pub auto_backup: bool,
    /// 自动备份间隔（秒）
    pub interval_secs: u64,
    /// 退出时备份
    pub backup_on_shutdown: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            auto_backup: true,
            interval_secs: 3600,
            backup_on_shutdown: true,
        }
    }
}

// ===== 分页 =====
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

impl AppConfig {
    /// 以指定存储根目录构造默认配置
    pub fn with_storage_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            storage: StorageConfig::rooted_at(root),
            ..Self::default()
        }
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: JSON 配置文件路径（None 时仅使用默认值 + 环境变量）
    ///
    /// # 返回
    /// - Ok(AppConfig): 已校验的配置
    /// - Err(ConfigError): 文件读取/解析失败或配置值无效
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取（缺省字段使用默认值）
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 环境变量覆写（空值忽略）
    pub fn apply_env_overrides(&mut self) {
        if let Some(root) = non_empty_env(ENV_STORAGE_ROOT) {
            self.storage.storage_root = PathBuf::from(root);
        }
        if let Some(db_path) = non_empty_env(ENV_DB_PATH) {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }
    }

    /// 校验配置值
    pub fn validate(&self) -> ConfigResult<()> {
        if self.validation.matricule_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "validation.matricule_length".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        // 数据库 CHECK 约束固定为 [0, 20]
        if self.validation.min_score < SCORE_FLOOR {
            return Err(ConfigError::InvalidValue {
                key: "validation.min_score".to_string(),
                message: format!("不能小于 {}", SCORE_FLOOR),
            });
        }
        if self.validation.max_score > SCORE_CEILING {
            return Err(ConfigError::InvalidValue {
                key: "validation.max_score".to_string(),
                message: format!("不能大于 {}", SCORE_CEILING),
            });
        }
        if self.validation.min_score > self.validation.max_score {
            return Err(ConfigError::InvalidValue {
                key: "validation.min_score".to_string(),
                message: format!(
                    "min_score ({}) 不能大于 max_score ({})",
                    self.validation.min_score, self.validation.max_score
                ),
            });
        }
        if self.backup.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backup.interval_secs".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        if self.pagination.page_size <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "pagination.page_size".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        let required = [
            ("import.matricule_column", &self.import.matricule_column),
            ("import.last_name_column", &self.import.last_name_column),
            ("import.first_name_column", &self.import.first_name_column),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "列名不能为空".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 默认存储根目录
///
/// 使用用户数据目录；开发构建使用独立目录，避免污染正式数据。
pub fn default_storage_root() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => {
            if cfg!(debug_assertions) {
                data_dir.join("student-tracker-dev")
            } else {
                data_dir.join("student-tracker")
            }
        }
        None => PathBuf::from("./student-tracker-data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_values() {
        let config = AppConfig::with_storage_root("/tmp/st");
        assert_eq!(config.validation.matricule_length, 12);
        assert_eq!(config.validation.max_score, 20.0);
        assert_eq!(config.import.sheet_names[0], "note");
        assert_eq!(config.backup.interval_secs, 3600);
        assert_eq!(config.pagination.page_size, 50);
        assert_eq!(
            config.storage.db_path(),
            PathBuf::from("/tmp/st/student_tracker.db")
        );
        assert_eq!(config.storage.backup_dir(), PathBuf::from("/tmp/st/backups"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"validation": {{"matricule_length": 8}}, "backup": {{"interval_secs": 60}}}}"#
        )
        .unwrap();

        let config = AppConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.validation.matricule_length, 8);
        assert_eq!(config.validation.max_score, 20.0);
        assert_eq!(config.backup.interval_secs, 60);
        assert!(config.backup.auto_backup);
        assert_eq!(config.import.export_sheet_name, "Students");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let result = AppConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_validate_rejects_inverted_score_range() {
        let mut config = AppConfig::with_storage_root("/tmp/st");
        config.validation.min_score = 10.0;
        config.validation.max_score = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_score_range_outside_storage_bounds() {
        let mut config = AppConfig::with_storage_root("/tmp/st");
        config.validation.max_score = 100.0;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "validation.max_score"),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut config = AppConfig::with_storage_root("/tmp/st");
        config.validation.min_score = -1.0;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "validation.min_score"),
            other => panic!("unexpected result: {other:?}"),
        }

        // 收窄范围仍然允许
        let mut config = AppConfig::with_storage_root("/tmp/st");
        config.validation.min_score = 5.0;
        config.validation.max_score = 15.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let mut storage = StorageConfig::rooted_at("/tmp/st");
        storage.db_path = Some(PathBuf::from("/data/custom.sqlite"));
        assert_eq!(storage.db_path(), PathBuf::from("/data/custom.sqlite"));
    }
}
