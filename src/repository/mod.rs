// ==========================================
// 学生档案管理 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 每次调用独立打开连接，不跨操作持有事务
// ==========================================

pub mod attendance_repo;
pub mod class_repo;
pub mod comment_repo;
pub mod error;
pub mod mark_repo;
pub mod student_repo;

// 重导出核心仓储
pub use attendance_repo::AttendanceRepository;
pub use class_repo::ClassSessionRepository;
pub use comment_repo::CommentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use mark_repo::MarkRepository;
pub use student_repo::StudentRepository;
