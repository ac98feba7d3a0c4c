//! Authentication and authorization error types

use parish_core::CoreError;
use parish_storage::StoreError;
use parish_validation::{ValidationError, ValidationErrors};
use thiserror::Error;

/// Authentication and authorization errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Username/email and password did not match an account
    #[error("Invalid username/email or password.")]
    InvalidCredentials,

    /// No signed-in user on the session
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session error: {message}")]
    SessionError { message: String },

    /// The account exists but may not sign in
    #[error("{message}")]
    UserDisabled { message: String },

    /// Authorization failures raised by the access gates
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// A looked-up record does not exist; the message is shown to the user
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Authentication configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Cryptographic error: {message}")]
    CryptographicError { message: String },

    #[error("Storage error during authentication: {message}")]
    StoreError { message: String },
}

impl AuthError {
    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::SessionError { .. } => "SESSION_ERROR",
            AuthError::UserDisabled { .. } => "USER_DISABLED",
            AuthError::AccessDenied { .. } => "ACCESS_DENIED",
            AuthError::NotFound { .. } => "NOT_FOUND",
            AuthError::Conflict { .. } => "CONFLICT",
            AuthError::BadRequest { .. } => "BAD_REQUEST",
            AuthError::Validation(_) => "VALIDATION_FAILED",
            AuthError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            AuthError::CryptographicError { .. } => "CRYPTOGRAPHIC_ERROR",
            AuthError::StoreError { .. } => "STORE_ERROR",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::Unauthenticated => 401,
            AuthError::SessionError { .. } => 401,
            AuthError::UserDisabled { .. } => 401,
            AuthError::AccessDenied { .. } => 403,
            AuthError::NotFound { .. } => 404,
            AuthError::Conflict { .. } => 409,
            AuthError::BadRequest { .. } => 400,
            AuthError::Validation(_) => 422,
            AuthError::ConfigurationError { .. } => 500,
            AuthError::CryptographicError { .. } => 500,
            AuthError::StoreError { .. } => 500,
        }
    }

    pub fn session_error(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    pub fn user_disabled(message: impl Into<String>) -> Self {
        Self::UserDisabled {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

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

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::CryptographicError {
            message: message.into(),
        }
    }

    pub fn store_error(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    /// Single form-level validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::non_field(message, "invalid").into())
    }
}

#[cfg(feature = "argon2")]
impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::crypto_error(err.to_string())
    }
}

#[cfg(feature = "bcrypt")]
impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::crypto_error(err.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource } => Self::not_found(format!("{} not found", resource)),
            StoreError::Conflict { message } => Self::conflict(message),
            other => Self::store_error(other.to_string()),
        }
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => Self::invalid(message),
            other => Self::store_error(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(AuthError::access_denied("x").error_code(), "ACCESS_DENIED");
        assert_eq!(AuthError::invalid("x").error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::user_disabled("x").status_code(), 401);
        assert_eq!(AuthError::access_denied("x").status_code(), 403);
        assert_eq!(AuthError::not_found("x").status_code(), 404);
        assert_eq!(AuthError::invalid("x").status_code(), 422);
        assert_eq!(AuthError::store_error("x").status_code(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = AuthError::access_denied("ChurchMember must be active.");
        assert_eq!(err.to_string(), "Access denied: ChurchMember must be active.");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username/email or password."
        );
    }

    #[test]
    fn test_store_errors_convert() {
        let err: AuthError = StoreError::conflict("username neema is already taken").into();
        assert_eq!(err, AuthError::conflict("username neema is already taken"));

        let err: AuthError = StoreError::database("connection reset").into();
        assert_eq!(err.status_code(), 500);
    }
}
