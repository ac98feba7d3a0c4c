//! # Structured Logging
//!
//! Subscriber setup for the parish service: JSON output in production,
//! pretty text while developing, and near-silence under test.

use parish_core::config::{AppConfig, Environment};
use serde_json::{json, Value};
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Include file and line number information
    pub include_location: bool,
    /// Include timestamp in logs
    pub include_timestamp: bool,
    /// Custom fields logged with the initialization message
    pub global_fields: serde_json::Map<String, Value>,
    /// Environment filter (supports directives like "parish_http=debug,tower_http=info")
    pub env_filter: Option<String>,
    pub service_name: Option<String>,
    pub service_version: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: true,
            include_location: false,
            include_timestamp: true,
            global_fields: serde_json::Map::new(),
            env_filter: None,
            service_name: None,
            service_version: None,
        }
    }
}

impl LoggingConfig {
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            include_location: false,
            include_timestamp: true,
            global_fields: {
                let mut fields = serde_json::Map::new();
                fields.insert("env".to_string(), json!("production"));
                fields
            },
            env_filter: Some(
                "parish_http=info,parish_auth=info,parish_registry=info,parish_sms=info,tower_http=warn,axum=warn"
                    .to_string(),
            ),
            service_name: None,
            service_version: None,
        }
    }

    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            include_location: true,
            include_timestamp: true,
            global_fields: {
                let mut fields = serde_json::Map::new();
                fields.insert("env".to_string(), json!("development"));
                fields
            },
            env_filter: Some("parish_http=debug,parish_auth=debug,parish_registry=debug,parish_sms=debug,tower_http=debug".to_string()),
            service_name: None,
            service_version: None,
        }
    }

    /// Minimal output for test runs
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            pretty_print: false,
            include_location: false,
            include_timestamp: false,
            global_fields: {
                let mut fields = serde_json::Map::new();
                fields.insert("env".to_string(), json!("test"));
                fields
            },
            env_filter: Some("parish_http=error".to_string()),
            service_name: None,
            service_version: None,
        }
    }

    /// Preset for the configured environment, honouring the configured level
    pub fn for_app(config: &AppConfig) -> Self {
        let preset = match config.environment {
            Environment::Production => Self::production(),
            Environment::Testing => Self::test(),
            Environment::Development => Self::development(),
        };
        Self {
            level: config.log_level.clone(),
            ..preset
        }
    }

    pub fn with_global_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.global_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_service(mut self, name: &str, version: &str) -> Self {
        self.service_name = Some(name.to_string());
        self.service_version = Some(version.to_string());
        self
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directives: `RUST_LOG` wins, then the configured filter, then the level
    fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        let directives = self.env_filter.as_deref().unwrap_or(&self.level);
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directives))
    }
}

/// Install the global subscriber
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.filter()?;
    let layer = Layer::new()
        .with_writer(io::stdout)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?;
    } else if config.pretty_print {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init()?;
    } else if config.include_timestamp {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.without_time())
            .try_init()?;
    }

    if !config.global_fields.is_empty() {
        let mut init_msg = json!({
            "message": "Structured logging initialized",
            "config": {
                "level": config.level,
                "json_format": config.json_format,
                "pretty_print": config.pretty_print,
            }
        });
        if let Some(name) = config.service_name {
            init_msg["service_name"] = json!(name);
        }
        if let Some(version) = config.service_version {
            init_msg["service_version"] = json!(version);
        }
        for (key, value) in config.global_fields {
            init_msg[key] = value;
        }
        tracing::info!(target: "parish::logging", "{}", init_msg);
    } else {
        tracing::info!(
            target: "parish::logging",
            "Structured logging initialized (level: {}, format: {})",
            config.level,
            if config.json_format { "JSON" } else { "text" }
        );
    }

    Ok(())
}

/// Log application startup with system information
pub fn log_startup_info(service_name: &str, service_version: &str, bind_address: &str) {
    let startup_info = json!({
        "event": "application_startup",
        "service": service_name,
        "version": service_version,
        "address": bind_address,
        "pid": std::process::id(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
    });

    tracing::info!(target: "parish::startup", "{}", startup_info);
}

pub fn log_shutdown_info(service_name: &str) {
    let shutdown_info = json!({
        "event": "application_shutdown",
        "service": service_name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    tracing::info!(target: "parish::shutdown", "{}", shutdown_info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let production = LoggingConfig::production();
        assert!(production.json_format);
        assert_eq!(production.global_fields["env"], json!("production"));

        let test = LoggingConfig::test();
        assert!(!test.include_timestamp);
        assert_eq!(test.level, "error");
    }

    #[test]
    fn test_for_app_keeps_configured_level() {
        let mut app = AppConfig::production();
        app.log_level = "warn".to_string();
        let config = LoggingConfig::for_app(&app).with_service("parish-admin", "0.1.0");

        assert!(config.json_format);
        assert_eq!(config.level, "warn");
        assert_eq!(config.service_name.as_deref(), Some("parish-admin"));
    }

    #[test]
    fn test_builders() {
        let config = LoggingConfig::default()
            .with_global_field("church", "KKKT-MKWAWA")
            .with_env_filter("parish_auth=trace");
        assert_eq!(config.global_fields["church"], json!("KKKT-MKWAWA"));
        assert_eq!(config.env_filter.as_deref(), Some("parish_auth=trace"));
        assert!(config.filter().is_ok());
    }
}
