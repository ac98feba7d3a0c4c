//! Beem Africa SMS gateway

use crate::provider::{SendReceipt, SmsMessage, SmsProvider, STATUS_NO_DATA, STATUS_UNKNOWN};
use crate::{SmsConfig, SmsError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

const PROVIDER: &str = "beem";

#[derive(Debug, Serialize)]
struct BeemSendRequest<'a> {
    source_addr: &'a str,
    encoding: u8,
    message: &'a str,
    recipients: Vec<BeemRecipient<'a>>,
}

#[derive(Debug, Serialize)]
struct BeemRecipient<'a> {
    recipient_id: u32,
    dest_addr: &'a str,
}

#[derive(Debug, Deserialize)]
struct BeemSendResponse {
    #[serde(default)]
    request_id: Option<Value>,
}

#[derive(Clone)]
pub struct BeemProvider {
    config: SmsConfig,
    client: Client,
}

impl std::fmt::Debug for BeemProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeemProvider")
            .field("sender_name", &self.config.sender_name)
            .field("send_url", &self.config.send_url)
            .finish_non_exhaustive()
    }
}

impl BeemProvider {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        config.validate()?;
        let timeout = config.timeout.unwrap_or(30);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| SmsError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// `Basic base64(api_key:secret_key)`
    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.api_key, self.config.secret_key);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn build_headers(&self) -> Result<HeaderMap, SmsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.authorization())
                .map_err(|e| SmsError::configuration(format!("Invalid API key format: {}", e)))?,
        );
        Ok(headers)
    }

    fn send_body<'a>(&'a self, message: &'a SmsMessage) -> BeemSendRequest<'a> {
        BeemSendRequest {
            source_addr: &self.config.sender_name,
            encoding: 0,
            message: &message.text,
            recipients: vec![BeemRecipient {
                recipient_id: 1,
                dest_addr: &message.to,
            }],
        }
    }

    fn delivery_url(&self, dest_addr: &str, request_id: &str) -> Result<url::Url, SmsError> {
        Ok(url::Url::parse_with_params(
            &self.config.delivery_url,
            &[("dest_addr", dest_addr), ("request_id", request_id)],
        )?)
    }
}

/// `request_id` may come back as a number or a string
fn request_id_from(response: BeemSendResponse) -> Option<String> {
    match response.request_id? {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// `data.credit_balance`, or `N/A` when the gateway omits it
fn credit_balance_from(body: &Value) -> String {
    match body.pointer("/data/credit_balance") {
        Some(Value::String(balance)) => balance.clone(),
        Some(Value::Number(balance)) => balance.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Status of the first delivery report
fn status_from(body: &Value) -> String {
    match body.as_array().and_then(|reports| reports.first()) {
        Some(report) => report
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or(STATUS_UNKNOWN)
            .to_string(),
        None => STATUS_NO_DATA.to_string(),
    }
}

#[async_trait]
impl SmsProvider for BeemProvider {
    async fn send(&self, message: &SmsMessage) -> Result<SendReceipt, SmsError> {
        debug!("Sending SMS via Beem to {}", message.to);

        let response = self
            .client
            .post(&self.config.send_url)
            .headers(self.build_headers()?)
            .json(&self.send_body(message))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let parsed = serde_json::from_str::<BeemSendResponse>(&text).ok();

        match parsed.and_then(request_id_from) {
            Some(request_id) => {
                info!(to = %message.to, request_id = %request_id, "SMS accepted by Beem");
                Ok(SendReceipt {
                    request_id,
                    provider: PROVIDER.to_string(),
                })
            }
            None => {
                error!("Beem send failed: HTTP {}: {}", status, text);
                Err(SmsError::provider(PROVIDER, "Beem API did not return request_id"))
            }
        }
    }

    async fn balance(&self) -> Result<String, SmsError> {
        let response = self
            .client
            .get(&self.config.balance_url)
            .headers(self.build_headers()?)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let text = response.text().await.unwrap_or_default();
            return Err(SmsError::provider(
                PROVIDER,
                format!("API Error {}: {}", status.as_u16(), text),
            ));
        }

        let body: Value = response.json().await?;
        Ok(credit_balance_from(&body))
    }

    async fn delivery_status(&self, dest_addr: &str, request_id: &str) -> Result<String, SmsError> {
        if dest_addr.is_empty() || request_id.is_empty() {
            return Err(SmsError::invalid_request("Missing dest_addr or request_id"));
        }

        let url = self.delivery_url(dest_addr, request_id)?;
        let response = self
            .client
            .get(url)
            .headers(self.build_headers()?)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let text = response.text().await.unwrap_or_default();
            error!(
                "Error fetching SMS status for {}: {} - {}",
                dest_addr, status, text
            );
            return Err(SmsError::provider(PROVIDER, text));
        }

        let body: Value = response.json().await?;
        Ok(status_from(&body))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
