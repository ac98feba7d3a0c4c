//! HTTP error types
//!
//! Every failure a route can produce ends up as an [`HttpError`], rendered as
//! `{"error": {"code", "message", "hint"}}` with the matching status code.
//! Validation failures also carry the per-field errors and the flattened
//! messages a form would flash back.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parish_auth::AuthError;
use parish_registry::RegistryError;
use parish_sms::SmsError;
use parish_storage::StoreError;
use parish_validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// Result type for route handlers
pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("{message}")]
    BadRequest { message: String },

    /// No signed-in user
    #[error("Authentication required")]
    Unauthenticated,

    /// Sign-in refused
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Validation failed")]
    ValidationError { errors: ValidationErrors },

    /// The SMS gateway could not be reached or refused the call
    #[error("SMS gateway error: {message}")]
    BadGateway { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl HttpError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        HttpError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        HttpError::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict<T: Into<String>>(message: T) -> Self {
        HttpError::Conflict {
            message: message.into(),
        }
    }

    pub fn bad_gateway<T: Into<String>>(message: T) -> Self {
        HttpError::BadGateway {
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::Unauthenticated => "UNAUTHENTICATED",
            HttpError::Unauthorized { .. } => "UNAUTHORIZED_ACCESS",
            HttpError::Forbidden { .. } => "ACCESS_FORBIDDEN",
            HttpError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            HttpError::Conflict { .. } => "RESOURCE_CONFLICT",
            HttpError::ValidationError { .. } => "VALIDATION_ERROR",
            HttpError::BadGateway { .. } => "SMS_GATEWAY_ERROR",
            HttpError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::Unauthenticated => StatusCode::UNAUTHORIZED,
            HttpError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::Conflict { .. } => StatusCode::CONFLICT,
            HttpError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error hint for user guidance
    pub fn error_hint(&self) -> Option<&'static str> {
        match self {
            HttpError::Unauthenticated => Some("Sign in at /accounts/login/"),
            HttpError::ValidationError { .. } => Some("Correct the errors below"),
            HttpError::BadGateway { .. } => Some("Retry the request"),
            _ => None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }

        let mut body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "hint": self.error_hint()
            }
        });
        if let HttpError::ValidationError { errors } = &self {
            body["error"]["fields"] = json!(errors.errors);
            body["error"]["messages"] = json!(errors.messages());
        }

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        HttpError::ValidationError { errors }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => HttpError::Unauthenticated,
            AuthError::InvalidCredentials
            | AuthError::SessionError { .. }
            | AuthError::UserDisabled { .. } => HttpError::unauthorized(err.to_string()),
            AuthError::AccessDenied { .. } => HttpError::forbidden(err.to_string()),
            AuthError::NotFound { message } => HttpError::NotFound { message },
            AuthError::Conflict { message } => HttpError::Conflict { message },
            AuthError::BadRequest { message } => HttpError::BadRequest { message },
            AuthError::Validation(errors) => HttpError::ValidationError { errors },
            other => HttpError::internal(other.to_string()),
        }
    }
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { message } => HttpError::NotFound { message },
            RegistryError::Conflict { message } | RegistryError::InvalidState { message } => {
                HttpError::Conflict { message }
            }
            RegistryError::Validation(errors) => HttpError::ValidationError { errors },
            RegistryError::Sms(err) => err.into(),
            RegistryError::Store { message } => HttpError::InternalError { message },
        }
    }
}

impl From<SmsError> for HttpError {
    fn from(err: SmsError) -> Self {
        match err {
            SmsError::Store { message } => HttpError::InternalError { message },
            other => HttpError::bad_gateway(other.to_string()),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource } => HttpError::not_found(format!("{} not found", resource)),
            StoreError::Conflict { message } => HttpError::Conflict { message },
            other => HttpError::internal(other.to_string()),
        }
    }
}
