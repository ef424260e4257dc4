// ==========================================
// 学生档案管理 - 字段校验
// ==========================================
// 职责: 学号格式、分数范围的纯函数校验
// 调用方: 仓储层在每次写入前调用
// ==========================================

use crate::config::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 校验规则标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationRule {
    MatriculeEmpty,
    MatriculeLength,
    MatriculeNotNumeric,
    ScoreNotNumber,
    ScoreOutOfRange,
}

/// 校验失败（规则 + 原因）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub rule: ValidationRule,
    pub reason: String,
}

impl ValidationFailure {
    fn new(rule: ValidationRule, reason: String) -> Self {
        Self { rule, reason }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ValidationFailure {}

// ==========================================
// FieldValidator - 字段校验器
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldValidator {
    matricule_length: usize,
    min_score: f64,
    max_score: f64,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl FieldValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            matricule_length: config.matricule_length,
            min_score: config.min_score,
            max_score: config.max_score,
        }
    }

    pub fn matricule_length(&self) -> usize {
        self.matricule_length
    }

    /// 校验学号
    ///
    /// # 规则
    /// - 去除首尾空白后不能为空
    /// - 长度必须等于配置长度（按字符计）
    /// - 只能包含 ASCII 数字
    pub fn validate_matricule(&self, value: &str) -> Result<(), ValidationFailure> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationFailure::new(
                ValidationRule::MatriculeEmpty,
                "Matricule cannot be empty".to_string(),
            ));
        }

        if value.chars().count() != self.matricule_length {
            return Err(ValidationFailure::new(
                ValidationRule::MatriculeLength,
                format!("Matricule must be {} characters", self.matricule_length),
            ));
        }

        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationFailure::new(
                ValidationRule::MatriculeNotNumeric,
                "Matricule must contain only numbers".to_string(),
            ));
        }

        Ok(())
    }

    /// 校验文本形式的分数
    ///
    /// # 返回
    /// - Ok(None): 空值（尚未打分）
    /// - Ok(Some(score)): 合法分数
    /// - Err: 非数字或超出范围
    pub fn validate_score(&self, value: Option<&str>) -> Result<Option<f64>, ValidationFailure> {
        let raw = match value.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(v) => v,
        };

        let score = raw.parse::<f64>().map_err(|_| {
            ValidationFailure::new(
                ValidationRule::ScoreNotNumber,
                "Score must be a number".to_string(),
            )
        })?;

        self.validate_score_value(score).map(Some)
    }

    /// 校验数值分数（闭区间）
    pub fn validate_score_value(&self, score: f64) -> Result<f64, ValidationFailure> {
        if !score.is_finite() {
            return Err(ValidationFailure::new(
                ValidationRule::ScoreNotNumber,
                "Score must be a number".to_string(),
            ));
        }
        if score < self.min_score || score > self.max_score {
            return Err(ValidationFailure::new(
                ValidationRule::ScoreOutOfRange,
                format!(
                    "Score must be between {} and {}",
                    self.min_score, self.max_score
                ),
            ));
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> FieldValidator {
        FieldValidator::default()
    }

    #[test]
    fn test_matricule_valid() {
        assert!(validator().validate_matricule("123456789012").is_ok());
        assert!(validator().validate_matricule("  000000000001 ").is_ok());
    }

    #[test]
    fn test_matricule_empty() {
        let err = validator().validate_matricule("   ").unwrap_err();
        assert_eq!(err.rule, ValidationRule::MatriculeEmpty);
    }

    #[test]
    fn test_matricule_wrong_length() {
        for value in ["1", "12345678901", "1234567890123"] {
            let err = validator().validate_matricule(value).unwrap_err();
            assert_eq!(err.rule, ValidationRule::MatriculeLength, "value={}", value);
        }
    }

    #[test]
    fn test_matricule_non_digit() {
        for value in ["12345678901a", "1234-6789012", "１２３４５６７８９０１２"] {
            let err = validator().validate_matricule(value).unwrap_err();
            assert_eq!(err.rule, ValidationRule::MatriculeNotNumeric, "value={}", value);
        }
    }

    #[test]
    fn test_matricule_every_exact_length_digit_string_passes() {
        let v = validator();
        for d in 0..10u32 {
            let value: String = std::iter::repeat(char::from_digit(d, 10).unwrap())
                .take(12)
                .collect();
            assert!(v.validate_matricule(&value).is_ok());
        }
    }

    #[test]
    fn test_matricule_respects_configured_length() {
        let v = FieldValidator::new(&ValidationConfig {
            matricule_length: 8,
            ..ValidationConfig::default()
        });
        assert!(v.validate_matricule("12345678").is_ok());
        assert!(v.validate_matricule("123456789012").is_err());
    }

    #[test]
    fn test_score_empty_is_valid() {
        assert_eq!(validator().validate_score(None).unwrap(), None);
        assert_eq!(validator().validate_score(Some("")).unwrap(), None);
        assert_eq!(validator().validate_score(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_score_bounds_inclusive() {
        let v = validator();
        assert_eq!(v.validate_score(Some("0")).unwrap(), Some(0.0));
        assert_eq!(v.validate_score(Some("20")).unwrap(), Some(20.0));
        assert_eq!(v.validate_score(Some("12.75")).unwrap(), Some(12.75));
    }

    #[test]
    fn test_score_out_of_range() {
        let v = validator();
        for value in ["-0.01", "20.5", "100"] {
            let err = v.validate_score(Some(value)).unwrap_err();
            assert_eq!(err.rule, ValidationRule::ScoreOutOfRange, "value={}", value);
        }
    }

    #[test]
    fn test_score_not_a_number() {
        let v = validator();
        assert_eq!(
            v.validate_score(Some("abc")).unwrap_err().rule,
            ValidationRule::ScoreNotNumber
        );
        assert_eq!(
            v.validate_score_value(f64::NAN).unwrap_err().rule,
            ValidationRule::ScoreNotNumber
        );
    }
}
