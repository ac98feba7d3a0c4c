//! Pattern-based validators using regular expressions

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Tanzanian mobile number in international form
pub const PHONE_PATTERN: &str = r"^\+255\d{9}$";

pub const PHONE_MESSAGE: &str =
    "Phone number must be in the format: +255XXXXXXXXX (9 digits after +255).";

/// Validator for regular expression patterns. The whole value must match.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
    pub message: Option<String>,
    code: &'static str,
}

impl PatternValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: regex,
            message: None,
            code: "pattern_mismatch",
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }

    /// `+255` followed by exactly nine digits
    pub fn phone() -> Self {
        let mut validator = Self::new(PHONE_PATTERN)
            .expect("phone pattern is a valid regex")
            .message(PHONE_MESSAGE);
        validator.code = "invalid_phone";
        validator
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern
            .find(text)
            .map_or(false, |m| m.start() == 0 && m.end() == text.len())
    }
}

#[async_trait]
impl ValidationRule for PatternValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if value.is_null() {
            return Ok(());
        }

        let Some(text) = value.as_str() else {
            return Err(ValidationError::with_code(
                field,
                format!("{} must be a string", field),
                "invalid_type",
            )
            .into());
        };

        if text.is_empty() || self.is_match(text) {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("{} does not match the required pattern", field));
        Err(ValidationError::with_code(field, message, self.code).into())
    }

    fn rule_name(&self) -> &'static str {
        "pattern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_phone_pattern() {
        let validator = PatternValidator::phone();

        assert!(validator.validate(&json!("+255712345678"), "phone_number").await.is_ok());

        for bad in ["0712345678", "+25571234567", "+2557123456789", "255712345678", "+255 712345678"] {
            let errors = validator
                .validate(&json!(bad), "phone_number")
                .await
                .unwrap_err();
            let messages = errors.messages();
            assert_eq!(messages, vec![PHONE_MESSAGE.to_string()], "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_empty_and_null_are_left_to_required() {
        let validator = PatternValidator::phone();
        assert!(validator.validate(&Value::Null, "phone_number").await.is_ok());
        assert!(validator.validate(&json!(""), "phone_number").await.is_ok());
    }

    #[tokio::test]
    async fn test_non_string_rejected() {
        let validator = PatternValidator::new(r"^\d+$").unwrap();
        let errors = validator.validate(&json!(42), "code").await.unwrap_err();
        assert_eq!(errors.get_field_errors("code").unwrap()[0].code, "invalid_type");
    }
}
