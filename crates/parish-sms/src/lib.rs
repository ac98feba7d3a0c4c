//! # parish-sms
//!
//! Outbound SMS for the parish service. [`SmsProvider`] abstracts the
//! gateway; [`BeemProvider`] talks to Beem Africa and [`MockSmsProvider`]
//! records messages in-process. [`SmsNotifier`] sends the member welcome and
//! approval texts, logs accepted messages and polls delivery reports. A
//! failed send is reported as an [`SmsOutcome`] and never aborts the
//! workflow that triggered it.

pub mod beem;
pub mod config;
pub mod error;
pub mod mock;
pub mod notifier;
pub mod provider;
pub mod templates;

pub use beem::BeemProvider;
pub use config::SmsConfig;
pub use error::SmsError;
pub use mock::MockSmsProvider;
pub use notifier::{SmsNotifier, SmsOutcome};
pub use provider::{SendReceipt, SmsMessage, SmsProvider, STATUS_NO_DATA, STATUS_UNKNOWN};
pub use templates::{MemberMessage, MessageTemplates};

pub type SmsResult<T> = Result<T, SmsError>;
