use thiserror::Error;

/// Result type for store and media operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Record not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Could not decode stored value: {message}")]
    Decode { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid media path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::not_found("row"),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                Self::conflict(db_err.message().to_string())
            }
            _ => Self::database(err.to_string()),
        }
    }
}

impl From<parish_core::CoreError> for StoreError {
    fn from(err: parish_core::CoreError) -> Self {
        Self::decode(err.to_string())
    }
}
