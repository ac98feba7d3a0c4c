//! Validation error types and handling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Field name used for errors that concern the whole form
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Individual validation error for a specific field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub field: String,
    /// Human-readable message, shown to the user as-is
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "validation_failed".to_string(),
        }
    }

    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// Error that belongs to the form rather than one field
    pub fn non_field(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::with_code(NON_FIELD_ERRORS, message, code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collection of validation errors keyed by field, in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors
            .entry(error.field.clone())
            .or_default()
            .push(error);
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn total_errors(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn get_field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).map_or(false, |errs| !errs.is_empty())
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    /// Every message in insertion order per field; form-level messages first.
    ///
    /// These are what gets flashed back to the user.
    pub fn messages(&self) -> Vec<String> {
        let form_level = self
            .errors
            .get(NON_FIELD_ERRORS)
            .into_iter()
            .flatten()
            .map(|e| e.message.clone());

        let field_level = self
            .errors
            .iter()
            .filter(|(field, _)| field.as_str() != NON_FIELD_ERRORS)
            .flat_map(|(_, errs)| errs.iter().map(|e| e.message.clone()));

        form_level.chain(field_level).collect()
    }

    /// Turn an empty collection into `Ok(())`
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// JSON body for API responses
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": self.errors,
                "messages": self.messages(),
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed for {} field(s):", self.errors.len())?;
            for message in self.messages() {
                write!(f, "\n  {}", message)?;
            }
            Ok(())
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}
