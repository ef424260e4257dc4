// ==========================================
// 学生档案管理 - 成绩数据仓储
// ==========================================
// 约束: 每个 (学生, 课次) 一条成绩；写入前校验分数范围
// 约束: 聚合只统计已打分（score 非空）的记录
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::records::{Mark, MarkAggregates};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::validation::FieldValidator;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct MarkRepository {
    db_path: PathBuf,
    validator: FieldValidator,
}

impl MarkRepository {
    pub fn new<P: AsRef<Path>>(db_path: P, validator: FieldValidator) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            validator,
        }
    }

    fn get_conn(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 设置成绩（upsert）
    ///
    /// # 参数
    /// - score: None 表示清空分数（保留记录）
    ///
    /// # 返回
    /// - Err(ValidationError): 分数非数字或超出范围
    /// - Err(ForeignKeyViolation): 学生或课次不存在
    pub fn set_score(
        &self,
        student_id: i64,
        class_id: i64,
        score: Option<f64>,
    ) -> RepositoryResult<i64> {
        let score = score
            .map(|s| self.validator.validate_score_value(s))
            .transpose()?;

        let conn = self.get_conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO marks (student_id, class_id, score)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(student_id, class_id) DO UPDATE SET score = excluded.score
            RETURNING id
            "#,
            params![student_id, class_id, score],
            |row| row.get(0),
        )?;
        debug!(student_id, class_id, ?score, "成绩已记录");
        Ok(id)
    }

    /// 以文本形式设置成绩（空串视为清空）
    pub fn set_score_text(
        &self,
        student_id: i64,
        class_id: i64,
        raw: &str,
    ) -> RepositoryResult<i64> {
        let score = self.validator.validate_score(Some(raw))?;
        self.set_score(student_id, class_id, score)
    }

    pub fn find(&self, student_id: i64, class_id: i64) -> RepositoryResult<Option<Mark>> {
        let conn = self.get_conn()?;
        let mark = conn
            .query_row(
                r#"
                SELECT id, student_id, class_id, score, created_at
                FROM marks WHERE student_id = ?1 AND class_id = ?2
                "#,
                params![student_id, class_id],
                map_mark,
            )
            .optional()?;
        Ok(mark)
    }

    pub fn list_for_student(&self, student_id: i64) -> RepositoryResult<Vec<Mark>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT m.id, m.student_id, m.class_id, m.score, m.created_at
            FROM marks m
            JOIN classes c ON c.id = m.class_id
            WHERE m.student_id = ?1
            ORDER BY c.class_date, c.id
            "#,
        )?;
        let marks = stmt
            .query_map(params![student_id], map_mark)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(marks)
    }

    /// 成绩聚合: 数量 / 平均 / 最高 / 最低
    ///
    /// 数量含未打分记录；平均/最高/最低只计已打分记录
    pub fn aggregates(&self, student_id: i64) -> RepositoryResult<MarkAggregates> {
        let conn = self.get_conn()?;
        let aggregates = conn.query_row(
            r#"
            SELECT COUNT(*), AVG(score), MAX(score), MIN(score)
            FROM marks WHERE student_id = ?1
            "#,
            params![student_id],
            |row| {
                Ok(MarkAggregates {
                    count: row.get(0)?,
                    average: row.get(1)?,
                    highest: row.get(2)?,
                    lowest: row.get(3)?,
                })
            },
        )?;
        Ok(aggregates)
    }
}

fn map_mark(row: &Row<'_>) -> rusqlite::Result<Mark> {
    Ok(Mark {
        id: row.get(0)?,
        student_id: row.get(1)?,
        class_id: row.get(2)?,
        score: row.get(3)?,
        created_at: row.get(4)?,
    })
}
