// ==========================================
// 学生档案管理 - API 层
// ==========================================
// 职责: 面向界面/命令行的业务 API，统一错误转换
// ==========================================

pub mod error;
pub mod student_api;
pub mod transfer_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse, GENERIC_ERROR_MESSAGE};
pub use student_api::StudentApi;
pub use transfer_api::TransferApi;
