// ==========================================
// 学生档案管理 - 考勤数据仓储
// ==========================================
// 约束: 每个 (学生, 课次) 只有一条考勤，重复记录时覆盖状态
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::records::{AttendanceCounts, AttendanceRecord};
use crate::domain::types::AttendanceStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct AttendanceRepository {
    db_path: PathBuf,
}

impl AttendanceRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 记录考勤（upsert）
    ///
    /// # 返回
    /// - Ok(i64): 考勤记录 id（已存在时为原记录 id）
    /// - Err(ForeignKeyViolation): 学生或课次不存在
    pub fn record(
        &self,
        student_id: i64,
        class_id: i64,
        status: AttendanceStatus,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO attendance (student_id, class_id, status)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(student_id, class_id) DO UPDATE SET status = excluded.status
            RETURNING id
            "#,
            params![student_id, class_id, status.as_db_str()],
            |row| row.get(0),
        )?;
        debug!(student_id, class_id, status = %status, "考勤已记录");
        Ok(id)
    }

    pub fn find(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT id, student_id, class_id, status, created_at
                FROM attendance WHERE student_id = ?1 AND class_id = ?2
                "#,
                params![student_id, class_id],
                map_attendance,
            )
            .optional()?;
        Ok(record)
    }

    /// 某学生全部考勤（按课次日期排序）
    pub fn list_for_student(&self, student_id: i64) -> RepositoryResult<Vec<AttendanceRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.id, a.student_id, a.class_id, a.status, a.created_at
            FROM attendance a
            JOIN classes c ON c.id = a.class_id
            WHERE a.student_id = ?1
            ORDER BY c.class_date, c.id
            "#,
        )?;
        let records = stmt
            .query_map(params![student_id], map_attendance)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// 按状态分组计数
    pub fn status_counts(&self, student_id: i64) -> RepositoryResult<AttendanceCounts> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM attendance WHERE student_id = ?1 GROUP BY status",
        )?;
        let rows = stmt.query_map(params![student_id], |row| {
            Ok((read_status(row, 0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = AttendanceCounts::default();
        for row in rows {
            let (status, count) = row?;
            counts.add(status, count);
        }
        Ok(counts)
    }
}

fn read_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<AttendanceStatus> {
    let raw: String = row.get(idx)?;
    raw.parse::<AttendanceStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn map_attendance(row: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        student_id: row.get(1)?,
        class_id: row.get(2)?,
        status: read_status(row, 3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::domain::{NewClassSession, NewStudent};
    use crate::repository::{ClassSessionRepository, StudentRepository};
    use crate::validation::FieldValidator;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        repo: AttendanceRepository,
        student_id: i64,
        class_ids: Vec<i64>,
    }

    fn setup() -> Fixture {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("attendance.db");
        init_database(&db_path).unwrap();

        let students = StudentRepository::new(&db_path, FieldValidator::default());
        let student_id = students
            .add_student(&NewStudent::new("123456789012", "Doe", "Jane"))
            .unwrap();

        let classes = ClassSessionRepository::new(&db_path);
        let class_ids = (1..=3)
            .map(|d| {
                classes
                    .create(&NewClassSession::new(
                        "Math",
                        NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    ))
                    .unwrap()
            })
            .collect();

        Fixture {
            _dir: dir,
            repo: AttendanceRepository::new(&db_path),
            student_id,
            class_ids,
        }
    }

    #[test]
    fn test_record_is_upsert() {
        let f = setup();
        let first = f
            .repo
            .record(f.student_id, f.class_ids[0], AttendanceStatus::Absent)
            .unwrap();
        let second = f
            .repo
            .record(f.student_id, f.class_ids[0], AttendanceStatus::JustifiedAbsent)
            .unwrap();
        assert_eq!(first, second);

        let record = f.repo.find(f.student_id, f.class_ids[0]).unwrap().unwrap();
        assert_eq!(record.status, AttendanceStatus::JustifiedAbsent);
        assert_eq!(f.repo.list_for_student(f.student_id).unwrap().len(), 1);
    }

    #[test]
    fn test_status_counts() {
        let f = setup();
        f.repo
            .record(f.student_id, f.class_ids[0], AttendanceStatus::Present)
            .unwrap();
        f.repo
            .record(f.student_id, f.class_ids[1], AttendanceStatus::Present)
            .unwrap();
        f.repo
            .record(f.student_id, f.class_ids[2], AttendanceStatus::Absent)
            .unwrap();

        let counts = f.repo.status_counts(f.student_id).unwrap();
        assert_eq!(counts.present, 2);
        assert_eq!(counts.absent, 1);
        assert_eq!(counts.justified, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_record_unknown_class_fails() {
        let f = setup();
        let err = f
            .repo
            .record(f.student_id, 999, AttendanceStatus::Present)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
