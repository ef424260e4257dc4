// ==========================================
// 学生档案管理 - 引擎层
// ==========================================
// 职责: 实现业务汇总规则,不拼 SQL
// ==========================================

pub mod statistics;

pub use statistics::StatisticsAggregator;
