use thiserror::Error;

use crate::config::ConfigError;

pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type for the parish domain
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("Record not found: {resource}")]
    NotFound { resource: String },
}

impl CoreError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Io(_) => "IO_ERROR",
            CoreError::Yaml(_) => "YAML_ERROR",
            CoreError::Json(_) => "JSON_ERROR",
            CoreError::Config(_) => "CONFIGURATION_ERROR",
            CoreError::Validation { .. } => "VALIDATION_ERROR",
            CoreError::InvalidValue { .. } => "INVALID_VALUE",
            CoreError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_value("status", "Archived");
        assert_eq!(err.to_string(), "Invalid value for status: 'Archived'");
        assert_eq!(err.error_code(), "INVALID_VALUE");

        let err = CoreError::validation("CHURCH_MEMBER users must be linked to a valid ChurchMember.");
        assert_eq!(
            err.to_string(),
            "Validation error: CHURCH_MEMBER users must be linked to a valid ChurchMember."
        );
    }
}
