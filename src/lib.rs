// ==========================================
// 学生档案管理 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + tokio
// 功能: 学生档案/课次/考勤/成绩/评语、统计、表格导入导出、备份
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 统计聚合
pub mod engine;

// 导入层 - 表格导入/导出
pub mod importer;

// 备份层 - 手动/自动备份
pub mod backup;

// 配置层 - 应用配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 字段校验
pub mod validation;

// 平台能力（文件选择/存储目录）
pub mod platform;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::AttendanceStatus;

// 领域实体
pub use domain::{
    AttendanceRecord, ClassSession, Comment, ImportSummary, Mark, NewClassSession, NewStudent,
    RowError, Student, StudentPage, StudentQuery, StudentStatistics,
};

// 配置
pub use config::AppConfig;

// API
pub use api::{ApiError, ApiResult, StudentApi, TransferApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Student Tracker";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
