// ==========================================
// 学生档案管理 - 评语数据仓储
// ==========================================
// 同一 (学生, 课次) 可有多条评语
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::records::Comment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CommentRepository {
    db_path: PathBuf,
}

impl CommentRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 添加评语，返回评语 id
    pub fn add(&self, student_id: i64, class_id: i64, text: &str) -> RepositoryResult<i64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RepositoryError::ValidationError(
                "Comment cannot be empty".to_string(),
            ));
        }

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO comments (student_id, class_id, comment) VALUES (?1, ?2, ?3)",
            params![student_id, class_id, text],
        )?;
        let id = conn.last_insert_rowid();
        debug!(comment_id = id, student_id, class_id, "评语已添加");
        Ok(id)
    }

    pub fn list_for_student(&self, student_id: i64) -> RepositoryResult<Vec<Comment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_id, class_id, comment, created_at
            FROM comments WHERE student_id = ?1
            ORDER BY id
            "#,
        )?;
        let comments = stmt
            .query_map(params![student_id], map_comment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    pub fn list_for_pair(&self, student_id: i64, class_id: i64) -> RepositoryResult<Vec<Comment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_id, class_id, comment, created_at
            FROM comments WHERE student_id = ?1 AND class_id = ?2
            ORDER BY id
            "#,
        )?;
        let comments = stmt
            .query_map(params![student_id, class_id], map_comment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Comment", id));
        }
        info!(comment_id = id, "评语已删除");
        Ok(())
    }
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        class_id: row.get(2)?,
        text: row.get(3)?,
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

    #[test]
    fn test_add_list_delete() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("comments.db");
        init_database(&db_path).unwrap();

        let student_id = StudentRepository::new(&db_path, FieldValidator::default())
            .add_student(&NewStudent::new("123456789012", "Doe", "Jane"))
            .unwrap();
        let class_id = ClassSessionRepository::new(&db_path)
            .create(&NewClassSession::new(
                "Chemistry",
                NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            ))
            .unwrap();

        let repo = CommentRepository::new(&db_path);
        let first = repo.add(student_id, class_id, "Good work").unwrap();
        repo.add(student_id, class_id, "  Late homework ").unwrap();

        let pair = repo.list_for_pair(student_id, class_id).unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[1].text, "Late homework");

        repo.delete(first).unwrap();
        assert_eq!(repo.list_for_student(student_id).unwrap().len(), 1);
        assert!(matches!(
            repo.delete(first).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("comments.db");
        init_database(&db_path).unwrap();

        let err = CommentRepository::new(&db_path).add(1, 1, "   ").unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
