// ==========================================
// 学生档案管理 - 学生数据仓储
// ==========================================
// 职责: 管理 students 表的 CRUD 与查询
// 约束: 每次调用独立打开连接，任何退出路径都随作用域释放
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::student::{NewStudent, Student, StudentPage, StudentQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::validation::FieldValidator;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STUDENT_COLUMNS: &str =
    "id, matricule, nom, prenom, section, groupe, created_at, updated_at";

// ==========================================
// StudentRepository - 学生仓储
// ==========================================
pub struct StudentRepository {
    db_path: PathBuf,
    validator: FieldValidator,
}

impl StudentRepository {
    /// 创建新的 StudentRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - validator: 学号校验器（由配置构造）
    pub fn new<P: AsRef<Path>>(db_path: P, validator: FieldValidator) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            validator,
        }
    }

    /// 打开本次调用使用的连接
    fn get_conn(&self) -> RepositoryResult<Connection> {
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }

    /// 新增学生
    ///
    /// # 返回
    /// - Ok(i64): 新记录 id
    /// - Err(ValidationError): 学号格式错误或姓名为空
    /// - Err(DuplicateKey): 学号已存在
    /// - Err(StorageError): 数据库错误
    pub fn add_student(&self, student: &NewStudent) -> RepositoryResult<i64> {
        let input = self.normalize(student)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO students (matricule, nom, prenom, section, groupe)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                input.matricule,
                input.last_name,
                input.first_name,
                input.section,
                input.group,
            ],
        )
        .map_err(|e| duplicate_matricule(e.into(), &input.matricule))?;

        let id = conn.last_insert_rowid();
        info!(
            student_id = id,
            matricule = %input.matricule,
            "学生已添加: {} {}",
            input.last_name,
            input.first_name
        );
        Ok(id)
    }

    /// 分页查询学生
    ///
    /// # 说明
    /// - group: 精确匹配（空字符串视为不过滤）
    /// - search_term: 学号/姓/名 子串匹配，区分大小写，支持 LIKE 通配符 % 与 _
    /// - 排序: 姓、名 升序
    /// - total_count: 同条件下的总数（独立 COUNT 查询，与分页无关）
    pub fn list_students(&self, query: &StudentQuery) -> RepositoryResult<StudentPage> {
        let (where_sql, filter_params) = build_filter(query);
        let conn = self.get_conn()?;

        let total_count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM students {}", where_sql),
            params_from_iter(filter_params.iter()),
            |row| row.get(0),
        )?;

        let mut page_params = filter_params;
        page_params.push(Value::Integer(query.limit.max(0)));
        page_params.push(Value::Integer(query.offset.max(0)));

        let sql = format!(
            "SELECT {} FROM students {} ORDER BY nom, prenom LIMIT ? OFFSET ?",
            STUDENT_COLUMNS, where_sql
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(page_params.iter()), map_student)?
            .collect::<rusqlite::Result<Vec<Student>>>()?;

        debug!(returned = items.len(), total_count, "学生列表查询完成");
        Ok(StudentPage { items, total_count })
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                &format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS),
                params![id],
                map_student,
            )
            .optional()?;
        Ok(student)
    }

    /// 按学号查询
    pub fn find_by_matricule(&self, matricule: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                &format!("SELECT {} FROM students WHERE matricule = ?1", STUDENT_COLUMNS),
                params![matricule.trim()],
                map_student,
            )
            .optional()?;
        Ok(student)
    }

    /// 更新学生
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    /// - Err(DuplicateKey): 新学号与其他学生冲突
    pub fn update_student(&self, id: i64, student: &NewStudent) -> RepositoryResult<()> {
        let input = self.normalize(student)?;

        let conn = self.get_conn()?;
        let affected = conn
            .execute(
                r#"
                UPDATE students
                SET matricule = ?1, nom = ?2, prenom = ?3, section = ?4, groupe = ?5,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?6
                "#,
                params![
                    input.matricule,
                    input.last_name,
                    input.first_name,
                    input.section,
                    input.group,
                    id,
                ],
            )
            .map_err(|e| duplicate_matricule(e.into(), &input.matricule))?;

        if affected == 0 {
            return Err(RepositoryError::not_found("Student", id));
        }
        info!(student_id = id, "学生已更新");
        Ok(())
    }

    /// 删除学生（级联删除考勤/成绩/评语）
    pub fn delete_student(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM students WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", id));
        }
        info!(student_id = id, "学生及其全部关联记录已删除");
        Ok(())
    }

    /// 全部非空分组（升序去重）
    pub fn list_groups(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT groupe FROM students WHERE groupe IS NOT NULL ORDER BY groupe",
        )?;
        let groups = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(groups)
    }

    /// 导出用查询（不分页，按姓、名排序）
    pub fn list_for_export(&self, group: Option<&str>) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let students = match group.map(str::trim).filter(|g| !g.is_empty()) {
            Some(group) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM students WHERE groupe = ?1 ORDER BY nom, prenom",
                    STUDENT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![group], map_student)?;
                rows.collect::<rusqlite::Result<Vec<Student>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM students ORDER BY nom, prenom",
                    STUDENT_COLUMNS
                ))?;
                let rows = stmt.query_map([], map_student)?;
                rows.collect::<rusqlite::Result<Vec<Student>>>()?
            }
        };
        Ok(students)
    }

    /// 学生总数
    pub fn count_students(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?)
    }

    /// 校验 + 规范化输入（trim，空可选字段转 None）
    fn normalize(&self, student: &NewStudent) -> RepositoryResult<NewStudent> {
        self.validator.validate_matricule(&student.matricule)?;

        let last_name = student.last_name.trim();
        let first_name = student.first_name.trim();
        if last_name.is_empty() || first_name.is_empty() {
            return Err(RepositoryError::ValidationError(
                "Last name and first name are required".to_string(),
            ));
        }

        Ok(NewStudent {
            matricule: student.matricule.trim().to_string(),
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            section: non_blank(student.section.as_deref()),
            group: non_blank(student.group.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 唯一约束错误补充学号信息
fn duplicate_matricule(err: RepositoryError, matricule: &str) -> RepositoryError {
    match err {
        RepositoryError::DuplicateKey(_) => RepositoryError::DuplicateKey(format!(
            "Student with matricule {} already exists",
            matricule
        )),
        other => other,
    }
}

/// 构造 WHERE 子句与参数
fn build_filter(query: &StudentQuery) -> (String, Vec<Value>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(group) = query.group.as_deref().filter(|g| !g.is_empty()) {
        clauses.push("groupe = ?");
        values.push(Value::Text(group.to_string()));
    }

    if let Some(term) = query.search_term.as_deref().filter(|t| !t.is_empty()) {
        clauses.push("(matricule GLOB ? OR nom GLOB ? OR prenom GLOB ?)");
        let pattern = like_term_to_glob(term);
        for _ in 0..3 {
            values.push(Value::Text(pattern.clone()));
        }
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), values)
    }
}

/// 将 `%term%` 形式的 LIKE 子串匹配改写为区分大小写的 GLOB 模式
///
/// `%` → `*`，`_` → `?`；GLOB 自身的元字符 `*` `?` `[` 按字面量转义。
pub(crate) fn like_term_to_glob(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('*');
    for c in term.chars() {
        match c {
            '%' => pattern.push('*'),
            '_' => pattern.push('?'),
            '*' => pattern.push_str("[*]"),
            '?' => pattern.push_str("[?]"),
            '[' => pattern.push_str("[[]"),
            other => pattern.push(other),
        }
    }
    pattern.push('*');
    pattern
}

fn map_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        matricule: row.get(1)?,
        last_name: row.get(2)?,
        first_name: row.get(3)?,
        section: row.get(4)?,
        group: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_term_to_glob_plain() {
        assert_eq!(like_term_to_glob("Doe"), "*Doe*");
    }

    #[test]
    fn test_like_term_to_glob_wildcards() {
        assert_eq!(like_term_to_glob("D%e_"), "*D*e?*");
        assert_eq!(like_term_to_glob("a*b?[c"), "*a[*]b[?][[]c*");
    }

    #[test]
    fn test_build_filter_ignores_blank_values() {
        let query = StudentQuery {
            group: Some(String::new()),
            search_term: Some(String::new()),
            ..StudentQuery::default()
        };
        let (sql, values) = build_filter(&query);
        assert!(sql.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn test_build_filter_group_and_search() {
        let query = StudentQuery::default().in_group("G1").search("Do");
        let (sql, values) = build_filter(&query);
        assert!(sql.starts_with("WHERE groupe = ?"));
        assert_eq!(values.len(), 4);
    }
}
