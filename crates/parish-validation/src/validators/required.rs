//! Required field validator

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use async_trait::async_trait;
use serde_json::Value;

/// Validator that ensures a field is present and not blank
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator {
    pub message: Option<String>,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self { message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    fn is_empty(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(arr) => arr.is_empty(),
            _ => false,
        }
    }
}

#[async_trait]
impl ValidationRule for RequiredValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        if Self::is_empty(value) {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| format!("{} is required", field));
            Err(ValidationError::with_code(field, message, "required").into())
        } else {
            Ok(())
        }
    }

    fn rule_name(&self) -> &'static str {
        "required"
    }
}

/// Minimum number of characters in a string value
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    pub min: usize,
}

impl MinLengthValidator {
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

#[async_trait]
impl ValidationRule for MinLengthValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        match value.as_str() {
            Some(text) if !text.is_empty() && text.chars().count() < self.min => Err(
                ValidationError::with_code(
                    field,
                    format!("{} must be at least {} characters long", field, self.min),
                    "min_length",
                )
                .into(),
            ),
            _ => Ok(()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "min_length"
    }
}
