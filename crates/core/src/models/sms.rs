use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status recorded when the gateway accepts a message
pub const SMS_STATUS_PENDING: &str = "PENDING";

/// Log entry for a message accepted by the SMS gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentSms {
    pub id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub phone_number: String,
    pub message: String,
    /// Gateway reference used to poll delivery reports
    pub request_id: String,
    /// Delivery status as last reported by the gateway
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl SentSms {
    pub fn pending(
        recipient_id: Option<Uuid>,
        phone_number: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            phone_number: phone_number.into(),
            message: message.into(),
            request_id: request_id.into(),
            status: SMS_STATUS_PENDING.to_string(),
            sent_at: Utc::now(),
        }
    }
}
