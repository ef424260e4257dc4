// ==========================================
// 学生档案管理 - 后台导入任务
// ==========================================
// 模型: 一个命名后台线程执行导入
// 进度: tokio mpsc 无界通道（多次）
// 完成: tokio oneshot（恰好一次）
// 约束: 不支持取消，启动后运行至完成或出错
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::ImportSummary;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ProgressSink;
use crate::importer::student_importer::StudentImporter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

const IMPORT_THREAD_NAME: &str = "student-import";

/// 进度事件（fraction ∈ (0, 1]）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub fraction: f64,
}

/// 通道进度上报（接收端关闭后静默丢弃）
struct ChannelProgress(mpsc::UnboundedSender<ImportProgress>);

impl ProgressSink for ChannelProgress {
    fn report(&self, fraction: f64) {
        let _ = self.0.send(ImportProgress { fraction });
    }
}

// ==========================================
// ImportTask - 后台导入
// ==========================================
pub struct ImportTask;

impl ImportTask {
    /// 启动后台导入
    ///
    /// # 返回
    /// - Ok(ImportHandle): 进度与完成通道
    /// - Err(TaskError): 线程创建失败
    pub fn spawn<C>(
        importer: Arc<StudentImporter<C>>,
        file_path: PathBuf,
        group_override: Option<String>,
    ) -> ImportResult<ImportHandle>
    where
        C: ImportConfigReader + 'static,
    {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();

        thread::Builder::new()
            .name(IMPORT_THREAD_NAME.to_string())
            .spawn(move || {
                let sink = ChannelProgress(progress_tx);
                let result =
                    importer.import_from_spreadsheet(&file_path, group_override.as_deref(), &sink);
                if let Err(e) = &result {
                    error!(error = %e, "后台导入失败");
                }
                // 先释放进度发送端，接收方据此判断进度结束
                drop(sink);
                let _ = done_tx.send(result);
            })
            .map_err(|e| ImportError::TaskError(e.to_string()))?;

        info!("后台导入任务已启动");
        Ok(ImportHandle {
            progress: progress_rx,
            completion: done_rx,
        })
    }
}

// ==========================================
// ImportHandle - 调用方句柄
// ==========================================
pub struct ImportHandle {
    progress: mpsc::UnboundedReceiver<ImportProgress>,
    completion: oneshot::Receiver<ImportResult<ImportSummary>>,
}

impl ImportHandle {
    /// 等待下一条进度；导入结束后返回 None
    pub async fn next_progress(&mut self) -> Option<ImportProgress> {
        self.progress.recv().await
    }

    /// 等待导入完成
    pub async fn wait(&mut self) -> ImportResult<ImportSummary> {
        match (&mut self.completion).await {
            Ok(result) => result,
            Err(_) => Err(ImportError::TaskError("导入线程未返回结果".to_string())),
        }
    }
}
