// ==========================================
// 学生档案管理 - 性能统计
// ==========================================
// PerfGuard: 记录一次操作的耗时与 SQL 语句数
// SQLite trace/profile: 统计语句数 + 慢查询告警
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 强制开启 SQL 统计的环境变量
pub const ENV_PERF_SQL: &str = "STUDENT_TRACKER_PERF_SQL";

/// 慢 SQL 阈值（毫秒）环境变量
pub const ENV_SLOW_SQL_MS: &str = "STUDENT_TRACKER_SLOW_SQL_MS";

static SQL_TRACING_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static GUARD_DEPTH: Cell<u32> = const { Cell::new(0) };
    static STATEMENTS: Cell<u64> = const { Cell::new(0) };
}

fn env_flag(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// 安装 SQLite 语句 trace/profile
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭
/// - `STUDENT_TRACKER_PERF_SQL=1` 强制开启
/// - `STUDENT_TRACKER_SLOW_SQL_MS=50` 配置慢 SQL 阈值
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var(ENV_PERF_SQL) {
        Ok(v) => env_flag(&v),
        Err(_) => cfg!(debug_assertions),
    };
    SQL_TRACING_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var(ENV_SLOW_SQL_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(on_sql_trace));
    conn.profile(Some(on_sql_profile));
}

fn on_sql_trace(_sql: &str) {
    if GUARD_DEPTH.with(|d| d.get()) > 0 {
        STATEMENTS.with(|c| c.set(c.get().saturating_add(1)));
    }
}

fn on_sql_profile(sql: &str, duration: Duration) {
    if !SQL_TRACING_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        let sql_line: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::warn!(target: "slow_sql", duration_ms = ms, sql = %sql_line, "slow sql");
    }
}

/// 操作级性能 Guard，Drop 时输出 elapsed_ms + sql_count
///
/// ```ignore
/// let _perf = student_tracker::perf::PerfGuard::new("import_students");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    statements_at_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            statements_at_start: STATEMENTS.with(|c| c.get()),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_count = STATEMENTS
            .with(|c| c.get())
            .saturating_sub(self.statements_at_start);

        tracing::info!(target: "perf", op = self.op, elapsed_ms, sql_count, "done");

        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
