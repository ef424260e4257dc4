// ==========================================
// 学生档案管理 - 学生领域模型
// ==========================================
// 对齐: students 表
// 红线: matricule 唯一，写入前必须通过格式校验
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 每页默认学生数
pub const DEFAULT_PAGE_SIZE: i64 = 50;

// ==========================================
// Student - 学生档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,                    // 自增主键
    pub matricule: String,          // 学号（定长纯数字）
    pub last_name: String,          // 姓
    pub first_name: String,         // 名
    pub section: Option<String>,    // 专业/方向
    pub group: Option<String>,      // 分组（列名 groupe）
    pub created_at: NaiveDateTime,  // 创建时间
    pub updated_at: NaiveDateTime,  // 最后修改时间
}

impl Student {
    /// 显示用全名（姓 名）
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

// ==========================================
// NewStudent - 新增/更新输入
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub matricule: String,
    pub last_name: String,
    pub first_name: String,
    pub section: Option<String>,
    pub group: Option<String>,
}

impl NewStudent {
    pub fn new(matricule: &str, last_name: &str, first_name: &str) -> Self {
        Self {
            matricule: matricule.to_string(),
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            section: None,
            group: None,
        }
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}

// ==========================================
// StudentQuery - 列表查询条件
// ==========================================
// group: 分组精确匹配
// search_term: 学号/姓/名 子串匹配（LIKE 语义）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentQuery {
    pub group: Option<String>,
    pub search_term: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            group: None,
            search_term: None,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StudentQuery {
    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search_term = Some(term.to_string());
        self
    }

    pub fn page(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

// ==========================================
// StudentPage - 分页结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPage {
    pub items: Vec<Student>,
    /// 满足条件的总数（与分页无关）
    pub total_count: i64,
}
