// ==========================================
// 学生档案管理 - 备份管理器
// ==========================================
// 方式: 数据库文件逐字节复制
// 命名: backup_<YYYYMMDD_HHMMSS>.<ext>，同一秒内重复备份会覆盖
// ==========================================

use crate::backup::error::{BackupError, BackupResult};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const BACKUP_PREFIX: &str = "backup_";
const DEFAULT_EXTENSION: &str = "db";

pub struct BackupManager {
    db_path: PathBuf,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(db_path: P, backup_dir: Q) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            backup_dir: backup_dir.as_ref().to_path_buf(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// 以当前本地时间创建备份
    pub fn backup(&self) -> BackupResult<PathBuf> {
        self.backup_at(Local::now().naive_local())
    }

    /// 以指定时间戳创建备份
    ///
    /// # 返回
    /// - Ok(PathBuf): 备份文件路径
    /// - Err(SourceMissing): 数据库文件不存在
    /// - Err(Io): 目录创建或复制失败
    pub fn backup_at(&self, now: NaiveDateTime) -> BackupResult<PathBuf> {
        let result = self.copy_database(now);
        match &result {
            Ok(path) => info!(backup = %path.display(), "数据库已备份"),
            Err(e) => error!(error = %e, "数据库备份失败"),
        }
        result
    }

    fn copy_database(&self, now: NaiveDateTime) -> BackupResult<PathBuf> {
        if !self.db_path.is_file() {
            return Err(BackupError::SourceMissing(self.db_path.clone()));
        }

        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| BackupError::io(&self.backup_dir, e))?;

        let ext = self
            .db_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        let target = self.backup_dir.join(backup_file_name(now, ext));

        fs::copy(&self.db_path, &target).map_err(|e| BackupError::io(&target, e))?;
        Ok(target)
    }

    /// 已有备份（按时间从旧到新）
    pub fn list_backups(&self) -> BackupResult<Vec<PathBuf>> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&self.backup_dir).map_err(|e| BackupError::io(&self.backup_dir, e))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackupError::io(&self.backup_dir, e))?;
            let path = entry.path();
            let is_backup = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(BACKUP_PREFIX))
                .unwrap_or(false);
            if is_backup && path.is_file() {
                backups.push(path);
            }
        }
        // 时间戳定长，字典序即时间序
        backups.sort();
        Ok(backups)
    }
}

/// 备份文件名: backup_<YYYYMMDD_HHMMSS>.<ext>
pub fn backup_file_name(now: NaiveDateTime, ext: &str) -> String {
    format!("{}{}.{}", BACKUP_PREFIX, now.format("%Y%m%d_%H%M%S"), ext)
}
