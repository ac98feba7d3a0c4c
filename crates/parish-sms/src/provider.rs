use crate::SmsError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Status reported when the gateway has no delivery report yet
pub const STATUS_NO_DATA: &str = "NO DATA";
/// Status reported when a delivery report carries no status field
pub const STATUS_UNKNOWN: &str = "UNKNOWN";

/// One outbound text message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    /// Destination in gateway format (country code, no leading `+`)
    pub to: String,
    pub text: String,
}

impl SmsMessage {
    pub fn new(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            text: text.into(),
        }
    }
}

/// Gateway acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub request_id: String,
    pub provider: String,
}

/// An SMS gateway
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Hand a message to the gateway. Succeeds only when the gateway returns
    /// a request id that delivery reports can be polled with.
    async fn send(&self, message: &SmsMessage) -> Result<SendReceipt, SmsError>;

    /// Remaining credit, as the gateway reports it
    async fn balance(&self) -> Result<String, SmsError>;

    /// Latest delivery status for a previously sent message
    async fn delivery_status(&self, dest_addr: &str, request_id: &str) -> Result<String, SmsError>;

    fn provider_name(&self) -> &'static str;
}
