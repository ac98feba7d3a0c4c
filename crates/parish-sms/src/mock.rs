//! In-process gateway for tests and local development

use crate::provider::{SendReceipt, SmsMessage, SmsProvider, STATUS_NO_DATA};
use crate::SmsError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MockState {
    sent: Vec<SmsMessage>,
    statuses: HashMap<String, String>,
    failure: Option<String>,
    next_id: u64,
}

/// Records every message instead of sending it
#[derive(Debug, Clone)]
pub struct MockSmsProvider {
    state: Arc<RwLock<MockState>>,
    balance: String,
}

impl MockSmsProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            balance: "100".to_string(),
        }
    }

    pub fn with_balance(mut self, balance: impl Into<String>) -> Self {
        self.balance = balance.into();
        self
    }

    /// Make every following send fail with `message`
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.write().await.failure = Some(message.into());
    }

    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Delivery status reported for `request_id`
    pub async fn set_status(&self, request_id: impl Into<String>, status: impl Into<String>) {
        self.state
            .write()
            .await
            .statuses
            .insert(request_id.into(), status.into());
    }

    pub async fn sent(&self) -> Vec<SmsMessage> {
        self.state.read().await.sent.clone()
    }
}

impl Default for MockSmsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsProvider for MockSmsProvider {
    async fn send(&self, message: &SmsMessage) -> Result<SendReceipt, SmsError> {
        let mut state = self.state.write().await;
        if let Some(failure) = &state.failure {
            return Err(SmsError::provider("mock", failure.clone()));
        }
        state.next_id += 1;
        let request_id = format!("mock-{}", state.next_id);
        state.sent.push(message.clone());
        Ok(SendReceipt {
            request_id,
            provider: "mock".to_string(),
        })
    }

    async fn balance(&self) -> Result<String, SmsError> {
        Ok(self.balance.clone())
    }

    async fn delivery_status(&self, dest_addr: &str, request_id: &str) -> Result<String, SmsError> {
        if dest_addr.is_empty() || request_id.is_empty() {
            return Err(SmsError::invalid_request("Missing dest_addr or request_id"));
        }
        Ok(self
            .state
            .read()
            .await
            .statuses
            .get(request_id)
            .cloned()
            .unwrap_or_else(|| STATUS_NO_DATA.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
