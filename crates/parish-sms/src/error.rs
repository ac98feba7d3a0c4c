use thiserror::Error;

/// SMS gateway errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmsError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Storage error: {message}")]
    Store { message: String },
}

impl SmsError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for SmsError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<url::ParseError> for SmsError {
    fn from(err: url::ParseError) -> Self {
        Self::configuration(format!("Invalid gateway URL: {}", err))
    }
}

impl From<tinytemplate::error::Error> for SmsError {
    fn from(err: tinytemplate::error::Error) -> Self {
        Self::template(err.to_string())
    }
}

impl From<parish_storage::StoreError> for SmsError {
    fn from(err: parish_storage::StoreError) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }
}
