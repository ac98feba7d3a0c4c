//! Registry workflow errors

use parish_core::CoreError;
use parish_sms::SmsError;
use parish_storage::StoreError;
use parish_validation::{ValidationError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The message is shown to the user as is
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    /// The record exists but is not in a state the workflow accepts
    #[error("{message}")]
    InvalidState { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("SMS error: {0}")]
    Sms(#[from] SmsError),

    #[error("Storage error: {message}")]
    Store { message: String },
}

impl RegistryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Single error on one form field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::with_code(field, message, "invalid").into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::NotFound { .. } => "NOT_FOUND",
            RegistryError::Conflict { .. } => "CONFLICT",
            RegistryError::InvalidState { .. } => "INVALID_STATE",
            RegistryError::Validation(_) => "VALIDATION_FAILED",
            RegistryError::Sms(_) => "SMS_ERROR",
            RegistryError::Store { .. } => "STORE_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::NotFound { .. } => 404,
            RegistryError::Conflict { .. } => 409,
            RegistryError::InvalidState { .. } => 409,
            RegistryError::Validation(_) => 422,
            RegistryError::Sms(_) => 502,
            RegistryError::Store { .. } => 500,
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource } => Self::not_found(format!("{} not found", resource)),
            StoreError::Conflict { message } => Self::conflict(message),
            other => Self::store(other.to_string()),
        }
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidValue { field, value } => {
                Self::field(&field, format!("'{}' is not a valid choice.", value))
            }
            CoreError::Validation { message } => {
                Self::Validation(ValidationError::non_field(message, "invalid").into())
            }
            CoreError::NotFound { resource } => Self::not_found(format!("{} not found", resource)),
            other => Self::store(other.to_string()),
        }
    }
}
