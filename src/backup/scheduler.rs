// ==========================================
// 学生档案管理 - 自动备份调度
// ==========================================
// 模型: 一个 tokio 任务，按固定间隔备份；首次备份在一个完整间隔之后
// 退出: shutdown() 停止循环并执行一次最终备份
// 约束: 任一次备份失败只记录 warn，循环继续
// ==========================================

use crate::backup::error::{BackupError, BackupResult};
use crate::backup::manager::BackupManager;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct AutoBackupScheduler;

impl AutoBackupScheduler {
    /// 启动自动备份任务（需在 tokio 运行时内调用）
    ///
    /// # 参数
    /// - interval: 备份间隔
    /// - backup_on_shutdown: shutdown 时是否执行最终备份
    pub fn spawn(
        manager: Arc<BackupManager>,
        interval: Duration,
        backup_on_shutdown: bool,
    ) -> AutoBackupHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let runs = Arc::new(AtomicUsize::new(0));
        let task_runs = runs.clone();

        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match run_backup(manager.clone()).await {
                            Ok(path) => {
                                task_runs.fetch_add(1, Ordering::Relaxed);
                                debug!(backup = %path.display(), "定时备份完成");
                            }
                            Err(e) => warn!(error = %e, "定时备份失败"),
                        }
                    }
                    // 句柄被丢弃同样视为退出信号
                    _ = &mut shutdown_rx => break,
                }
            }

            if !backup_on_shutdown {
                return Ok(None);
            }
            info!("退出前执行最终备份");
            run_backup(manager).await.map(Some)
        });

        info!(interval_secs = interval.as_secs(), "自动备份已启动");
        AutoBackupHandle {
            shutdown_tx: Some(shutdown_tx),
            join,
            runs,
        }
    }
}

async fn run_backup(manager: Arc<BackupManager>) -> BackupResult<PathBuf> {
    tokio::task::spawn_blocking(move || manager.backup())
        .await
        .map_err(|e| BackupError::TaskFailed(e.to_string()))?
}

// ==========================================
// AutoBackupHandle - 调度句柄
// ==========================================
pub struct AutoBackupHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<BackupResult<Option<PathBuf>>>,
    runs: Arc<AtomicUsize>,
}

impl AutoBackupHandle {
    /// 已成功完成的定时备份次数（不含最终备份）
    pub fn completed_runs(&self) -> usize {
        self.runs.load(Ordering::Relaxed)
    }

    /// 停止调度并等待最终备份
    ///
    /// # 返回
    /// - Ok(Some(path)): 最终备份路径
    /// - Ok(None): 配置为退出时不备份
    pub async fn shutdown(mut self) -> BackupResult<Option<PathBuf>> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(BackupError::TaskFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> Arc<BackupManager> {
        let db_path = dir.path().join("students.db");
        std::fs::write(&db_path, b"data").unwrap();
        Arc::new(BackupManager::new(&db_path, dir.path().join("backups")))
    }

    #[tokio::test]
    async fn test_shutdown_performs_final_backup() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let handle =
            AutoBackupScheduler::spawn(manager.clone(), Duration::from_secs(3600), true);
        let final_backup = handle.shutdown().await.unwrap();

        let path = final_backup.expect("final backup path");
        assert!(path.exists());
        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_without_final_backup() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let handle =
            AutoBackupScheduler::spawn(manager.clone(), Duration::from_secs(3600), false);
        assert_eq!(handle.shutdown().await.unwrap(), None);
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_periodic_backup_runs() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let handle = AutoBackupScheduler::spawn(manager, Duration::from_millis(50), false);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(handle.completed_runs() >= 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let dir = TempDir::new().unwrap();
        let manager = Arc::new(BackupManager::new(
            dir.path().join("missing.db"),
            dir.path().join("backups"),
        ));

        let handle = AutoBackupScheduler::spawn(manager, Duration::from_millis(20), true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.completed_runs(), 0);
        assert!(matches!(
            handle.shutdown().await.unwrap_err(),
            BackupError::SourceMissing(_)
        ));
    }
}
