// ==========================================
// 学生档案管理 - 平台能力接口
// ==========================================
// 文件选择与存储根目录通过 Trait 注入
// 桌面实现: PresetFileSelector / DesktopStorage
// ==========================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文件选择结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Selected(PathBuf),
    Cancelled,
}

/// 表格文件选择能力
pub trait FileSelector: Send + Sync {
    fn select_spreadsheet(&self) -> FileSelection;
}

/// 预置路径的选择器（脚本/命令行场景；None 表示用户取消）
#[derive(Debug, Clone, Default)]
pub struct PresetFileSelector {
    path: Option<PathBuf>,
}

impl PresetFileSelector {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

impl FileSelector for PresetFileSelector {
    fn select_spreadsheet(&self) -> FileSelection {
        match &self.path {
            Some(path) => FileSelection::Selected(path.clone()),
            None => FileSelection::Cancelled,
        }
    }
}

/// 存储访问能力
pub trait StorageAccessor: Send + Sync {
    /// 应用数据根目录（备份、导出位于其下）
    fn storage_root(&self) -> PathBuf;

    /// 确保根目录可写；不可用时返回 IO 错误
    fn ensure_access(&self) -> io::Result<()>;
}

/// 桌面存储：普通目录，按需创建
#[derive(Debug, Clone)]
pub struct DesktopStorage {
    root: PathBuf,
}

impl DesktopStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl StorageAccessor for DesktopStorage {
    fn storage_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn ensure_access(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let metadata = fs::metadata(&self.root)?;
        if metadata.permissions().readonly() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("存储目录只读: {}", self.root.display()),
            ));
        }
        debug!(root = %self.root.display(), "存储目录可用");
        Ok(())
    }
}
