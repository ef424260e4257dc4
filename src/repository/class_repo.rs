// ==========================================
// 学生档案管理 - 课次数据仓储
// ==========================================
// 职责: 管理 classes 表
// 约束: 删除课次级联删除其考勤/成绩/评语
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::class_session::{ClassSession, NewClassSession};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::info;

const CLASS_COLUMNS: &str = "id, course_name, subject_name, class_date, groupe, created_at";

pub struct ClassSessionRepository {
    db_path: PathBuf,
}

impl ClassSessionRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 创建课次
    ///
    /// # 返回
    /// - Ok(i64): 新课次 id
    /// - Err(ValidationError): 课程名为空
    pub fn create(&self, session: &NewClassSession) -> RepositoryResult<i64> {
        let course_name = session.course_name.trim();
        if course_name.is_empty() {
            return Err(RepositoryError::ValidationError(
                "Course name is required".to_string(),
            ));
        }
        let subject = blank_to_none(session.subject_name.as_deref());
        let group = blank_to_none(session.group.as_deref());

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO classes (course_name, subject_name, class_date, groupe)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![course_name, subject, session.date, group],
        )?;

        let id = conn.last_insert_rowid();
        info!(class_id = id, course = course_name, date = %session.date, "课次已创建");
        Ok(id)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ClassSession>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                &format!("SELECT {} FROM classes WHERE id = ?1", CLASS_COLUMNS),
                params![id],
                map_class,
            )
            .optional()?;
        Ok(session)
    }

    /// 课次列表（按日期、id 升序；group 为 None 时返回全部）
    pub fn list(&self, group: Option<&str>) -> RepositoryResult<Vec<ClassSession>> {
        let conn = self.get_conn()?;
        let sessions = match blank_to_none(group) {
            Some(group) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM classes WHERE groupe = ?1 ORDER BY class_date, id",
                    CLASS_COLUMNS
                ))?;
                let rows = stmt.query_map(params![group], map_class)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM classes ORDER BY class_date, id",
                    CLASS_COLUMNS
                ))?;
                let rows = stmt.query_map([], map_class)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(sessions)
    }

    /// 删除课次（级联）
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM classes WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ClassSession", id));
        }
        info!(class_id = id, "课次已删除");
        Ok(())
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn map_class(row: &Row<'_>) -> rusqlite::Result<ClassSession> {
    Ok(ClassSession {
        id: row.get(0)?,
        course_name: row.get(1)?,
        subject_name: row.get(2)?,
        date: row.get(3)?,
        group: row.get(4)?,
        created_at: row.get(5)?,
    })
}
