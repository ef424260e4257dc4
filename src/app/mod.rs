// ==========================================
// 学生档案管理 - 应用层
// ==========================================
// 职责: 由配置装配全部组件
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
