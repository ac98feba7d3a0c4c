//! Gateway credentials and endpoints

use crate::SmsError;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_SEND_URL: &str = "https://apisms.beem.africa/v1/send";
pub const DEFAULT_BALANCE_URL: &str = "https://apisms.beem.africa/public/v1/vendors/balance";
pub const DEFAULT_DELIVERY_URL: &str = "https://dlrapi.beem.africa/public/v1/delivery-reports";

/// Beem Africa provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Registered sender id shown on the handset
    pub sender_name: String,
    pub api_key: String,
    pub secret_key: String,
    #[serde(default = "default_send_url")]
    pub send_url: String,
    #[serde(default = "default_balance_url")]
    pub balance_url: String,
    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_send_url() -> String {
    DEFAULT_SEND_URL.to_string()
}

fn default_balance_url() -> String {
    DEFAULT_BALANCE_URL.to_string()
}

fn default_delivery_url() -> String {
    DEFAULT_DELIVERY_URL.to_string()
}

impl SmsConfig {
    pub fn new(
        sender_name: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            sender_name: sender_name.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            send_url: default_send_url(),
            balance_url: default_balance_url(),
            delivery_url: default_delivery_url(),
            timeout: None,
        }
    }

    /// Read `BEEM_SENDER_NAME`, `BEEM_API_KEY` and `BEEM_SECRET_KEY`
    pub fn from_env() -> Result<Self, SmsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    SmsError::configuration(format!("Missing Beem API credentials: {} is not set", key))
                })
        };

        let mut config = Self::new(
            required("BEEM_SENDER_NAME")?,
            required("BEEM_API_KEY")?,
            required("BEEM_SECRET_KEY")?,
        );
        if let Some(timeout) = lookup("BEEM_TIMEOUT_SECS") {
            config.timeout = Some(timeout.parse().map_err(|_| {
                SmsError::configuration(format!("BEEM_TIMEOUT_SECS must be a number, got {}", timeout))
            })?);
        }
        Ok(config)
    }

    pub fn with_endpoints(
        mut self,
        send_url: impl Into<String>,
        balance_url: impl Into<String>,
        delivery_url: impl Into<String>,
    ) -> Self {
        self.send_url = send_url.into();
        self.balance_url = balance_url.into();
        self.delivery_url = delivery_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), SmsError> {
        for (name, value) in [
            ("sender_name", &self.sender_name),
            ("api_key", &self.api_key),
            ("secret_key", &self.secret_key),
        ] {
            if value.trim().is_empty() {
                return Err(SmsError::configuration(format!("{} cannot be empty", name)));
            }
        }
        for url in [&self.send_url, &self.balance_url, &self.delivery_url] {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = SmsConfig::from_lookup(lookup(&[
            ("BEEM_SENDER_NAME", "KKKT-MKWAWA"),
            ("BEEM_API_KEY", "key"),
            ("BEEM_SECRET_KEY", "secret"),
            ("BEEM_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.sender_name, "KKKT-MKWAWA");
        assert_eq!(config.send_url, DEFAULT_SEND_URL);
        assert_eq!(config.timeout, Some(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials() {
        let err = SmsConfig::from_lookup(lookup(&[
            ("BEEM_SENDER_NAME", "KKKT-MKWAWA"),
            ("BEEM_API_KEY", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, SmsError::Configuration { .. }));
        assert!(err.to_string().contains("BEEM_API_KEY"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = SmsConfig::new("S", "k", "s").with_endpoints("not a url", DEFAULT_BALANCE_URL, DEFAULT_DELIVERY_URL);
        assert!(config.validate().is_err());
    }
}
