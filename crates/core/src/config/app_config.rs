use crate::config::ConfigError;
use crate::errors::CoreResult;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Paths that are never remembered as a user's last visited page.
pub const DEFAULT_IGNORED_PATHS: &[&str] = &[
    "/",
    "/accounts/login/",
    "/accounts/request-account/",
    "/accounts/forgot-password/",
    "/accounts/welcome/page/",
    "/news/public/",
];

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "test")]
    Testing,
    #[serde(alias = "prod")]
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get debug mode status based on environment
    pub fn debug_mode(&self) -> bool {
        !self.is_production()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Application configuration, loaded from YAML and/or `PARISH_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Root directory for uploaded profile pictures, certificates and news media
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    #[serde(default = "default_session_cookie")]
    pub session_cookie_name: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,
    /// Public base URL used in outbound SMS links
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_church_name")]
    pub church_name: String,
    #[serde(default = "default_ignored_paths")]
    pub ignored_paths: Vec<String>,
}

fn default_debug() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_session_cookie() -> String {
    "session_id".to_string()
}

fn default_session_ttl() -> i64 {
    60 * 24
}

fn default_site_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_church_name() -> String {
    "KKKT-MKWAWA".to_string()
}

pub fn default_ignored_paths() -> Vec<String> {
    DEFAULT_IGNORED_PATHS.iter().map(|p| p.to_string()).collect()
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            environment: Environment::Development,
            debug: default_debug(),
            host: default_host(),
            port: default_port(),
            database_url: None,
            log_level: default_log_level(),
            media_root: default_media_root(),
            session_cookie_name: default_session_cookie(),
            session_ttl_minutes: default_session_ttl(),
            site_url: default_site_url(),
            church_name: default_church_name(),
            ignored_paths: default_ignored_paths(),
        }
    }

    /// Create configuration for development
    pub fn development() -> Self {
        Self {
            database_url: Some("postgres://localhost/parish_dev".to_string()),
            log_level: "debug".to_string(),
            ..Self::new()
        }
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            port: 0,
            log_level: "warn".to_string(),
            ..Self::new()
        }
    }

    /// Create configuration for production
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..Self::new()
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }

    /// Link sent to members so they can request a login account
    pub fn request_account_url(&self) -> String {
        format!("{}/accounts/request-account/", self.site_url.trim_end_matches('/'))
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, then apply environment overrides
    pub fn from_yaml_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_overrides(&|key: &str| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env_str) = lookup("PARISH_ENV") {
            self.environment = env_str.parse()?;
            self.debug = self.environment.debug_mode();
        }

        if let Some(debug_str) = lookup("PARISH_DEBUG") {
            self.debug = debug_str.parse().unwrap_or(self.environment.debug_mode());
        }

        if let Some(port_str) = lookup("PARISH_PORT") {
            self.port = port_str.parse().map_err(|_| {
                ConfigError::invalid("port", port_str.clone(), "valid port number (0-65535)")
            })?;
        }

        if let Some(host) = lookup("PARISH_HOST") {
            self.host = host;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }

        if let Some(level) = lookup("PARISH_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(root) = lookup("PARISH_MEDIA_ROOT") {
            self.media_root = PathBuf::from(root);
        }

        if let Some(site_url) = lookup("PARISH_SITE_URL") {
            self.site_url = site_url;
        }

        if let Some(cookie) = lookup("PARISH_SESSION_COOKIE") {
            self.session_cookie_name = cookie;
        }

        if let Some(ttl) = lookup("PARISH_SESSION_TTL_MINUTES") {
            self.session_ttl_minutes = ttl.parse().map_err(|_| {
                ConfigError::invalid("session_ttl_minutes", ttl.clone(), "a whole number of minutes")
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.environment.is_testing() && self.port == 0 {
            return Err(ConfigError::invalid(
                "port",
                self.port.to_string(),
                "port between 1 and 65535",
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid(
                "log_level",
                self.log_level.clone(),
                format!("one of: {}", valid_levels.join(", ")),
            ));
        }

        if self.session_ttl_minutes <= 0 {
            return Err(ConfigError::invalid(
                "session_ttl_minutes",
                self.session_ttl_minutes.to_string(),
                "a positive number of minutes",
            ));
        }

        if self.environment.is_production() {
            if self.database_url.is_none() {
                return Err(ConfigError::missing(
                    "database_url",
                    "DATABASE_URL environment variable is required in production",
                ));
            }

            if self.debug {
                return Err(ConfigError::invalid(
                    "debug",
                    "true",
                    "false in production environment",
                ));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Testing".parse::<Environment>().unwrap(), Environment::Testing);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PARISH_PORT", "8088"),
            ("PARISH_SITE_URL", "https://parish.example.org/"),
            ("PARISH_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8088);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.request_account_url(),
            "https://parish.example.org/accounts/request-account/"
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("PARISH_PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_production_requires_database() {
        let config = AppConfig::production();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { .. })
        ));

        let mut config = AppConfig::production();
        config.database_url = Some("postgres://db/parish".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_zero_only_in_testing() {
        assert!(AppConfig::testing().validate().is_ok());

        let mut config = AppConfig::development();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config = AppConfig::from_yaml_str("port: 9000\nchurch_name: St. Paul\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.church_name, "St. Paul");
        assert_eq!(config.session_cookie_name, "session_id");
        assert!(config.ignored_paths.contains(&"/accounts/login/".to_string()));
    }

    #[test]
    fn test_yaml_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "environment: test\nport: 0\nlog_level: warn").unwrap();

        let config = AppConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.environment, Environment::Testing);
    }
}
