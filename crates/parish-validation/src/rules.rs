//! Composable rule sets

use crate::error::{ValidationErrors, ValidationResult};
use crate::traits::{FormData, ValidateField, ValidateRequest, ValidationRule};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Field rules plus form-level rules
#[derive(Clone, Default)]
pub struct Rules {
    field_rules: HashMap<String, Vec<Arc<dyn ValidationRule>>>,
    request_rules: Vec<Arc<dyn ValidateRequest>>,
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("fields", &self.field_rules.keys().collect::<Vec<_>>())
            .field("request_rules_count", &self.request_rules.len())
            .finish()
    }
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<R>(mut self, field: impl Into<String>, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.field_rules
            .entry(field.into())
            .or_default()
            .push(Arc::new(rule));
        self
    }

    pub fn request<R>(mut self, rule: R) -> Self
    where
        R: ValidateRequest + 'static,
    {
        self.request_rules.push(Arc::new(rule));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_rules.is_empty() && self.request_rules.is_empty()
    }

    /// Validate, treating fields absent from `data` as null so `required` fires
    pub async fn check(&self, data: &FormData) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();

        for field in self.field_rules.keys() {
            let value = data.get(field).unwrap_or(&Value::Null);
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

#[async_trait]
impl ValidateField for Rules {
    async fn validate_field(&self, field: &str, value: &Value) -> ValidationResult<()> {
        let Some(rules) = self.field_rules.get(field) else {
            return Ok(());
        };

        let mut errors = ValidationErrors::new();
        for rule in rules {
            if let Err(rule_errors) = rule.validate(value, field).await {
                errors.merge(rule_errors);
            }
        }
        errors.into_result()
    }
}

#[async_trait]
impl ValidateRequest for Rules {
    async fn validate_request(&self, data: &FormData) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        for rule in &self.request_rules {
            if let Err(rule_errors) = rule.validate_request(data).await {
                errors.merge(rule_errors);
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{PatternValidator, RequiredValidator};
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_fields_are_checked() {
        let rules = Rules::new()
            .field("full_name", RequiredValidator::new())
            .field("phone_number", RequiredValidator::new())
            .field("phone_number", PatternValidator::phone());

        let mut data = FormData::new();
        data.insert("phone_number".into(), json!("0712"));

        let errors = rules.check(&data).await.unwrap_err();
        assert!(errors.has_field_errors("full_name"));
        assert_eq!(errors.get_field_errors("phone_number").map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_fields_pass() {
        let rules = Rules::new().field("full_name", RequiredValidator::new());
        assert!(rules.validate_field("nickname", &json!("")).await.is_ok());
    }
}
