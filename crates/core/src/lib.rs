//! # parish-core
//!
//! Domain model shared by every parish crate: church members, leaders,
//! login accounts, the SMS log and news items, together with the
//! application configuration and the small humanizing helpers used when
//! presenting records.

pub mod config;
pub mod errors;
pub mod flash;
pub mod humanize;
pub mod models;
pub mod phone;

pub use config::{AppConfig, ConfigError, Environment};
pub use errors::{CoreError, CoreResult};
pub use flash::{FlashLevel, FlashMessage};
pub use models::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
