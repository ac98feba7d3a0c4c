//! Core validation traits

use crate::error::{ValidationErrors, ValidationResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Form data as submitted: field name to JSON value
pub type FormData = HashMap<String, Value>;

/// A single rule applied to one field value
#[async_trait]
pub trait ValidationRule: Send + Sync {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()>;

    fn rule_name(&self) -> &'static str;
}

/// Per-field validation
#[async_trait]
pub trait ValidateField: Send + Sync {
    async fn validate_field(&self, field: &str, value: &Value) -> ValidationResult<()>;
}

/// Cross-field validation over the whole form
#[async_trait]
pub trait ValidateRequest: Send + Sync {
    async fn validate_request(&self, data: &FormData) -> ValidationResult<()>;
}

/// Runs field rules, then request rules, and collects every error
#[async_trait]
pub trait Validate: ValidateField + ValidateRequest + Send + Sync {
    async fn validate(&self, data: &FormData) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();

        for (field, value) in data {
            if let Err(field_errors) = self.validate_field(field, value).await {
                errors.merge(field_errors);
            }
        }

        if let Err(request_errors) = self.validate_request(data).await {
            errors.merge(request_errors);
        }

        errors.into_result()
    }
}

impl<T> Validate for T where T: ValidateField + ValidateRequest + Send + Sync {}

/// Read a boolean form flag. Missing, null and unparsable values are `false`;
/// checkbox-style strings ("on", "true", "1") are `true`.
pub fn flag(data: &FormData, field: &str) -> bool {
    match data.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes"),
        Some(Value::Number(n)) => n.as_i64().map_or(false, |n| n != 0),
        _ => false,
    }
}

/// Read a trimmed, non-empty string field
pub fn text<'a>(data: &'a FormData, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_parsing() {
        let mut data = FormData::new();
        data.insert("a".into(), json!(true));
        data.insert("b".into(), json!("on"));
        data.insert("c".into(), json!("off"));
        data.insert("d".into(), json!(1));
        data.insert("e".into(), Value::Null);

        assert!(flag(&data, "a"));
        assert!(flag(&data, "b"));
        assert!(!flag(&data, "c"));
        assert!(flag(&data, "d"));
        assert!(!flag(&data, "e"));
        assert!(!flag(&data, "missing"));
    }

    #[test]
    fn test_text_trims_and_drops_blank() {
        let mut data = FormData::new();
        data.insert("name".into(), json!("  Juma  "));
        data.insert("blank".into(), json!("   "));

        assert_eq!(text(&data, "name"), Some("Juma"));
        assert_eq!(text(&data, "blank"), None);
    }
}
