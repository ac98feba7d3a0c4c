//! Best-effort member notifications with a persistent send log

use crate::provider::{SmsMessage, SmsProvider};
use crate::templates::{MemberMessage, MessageTemplates};
use crate::SmsError;
use parish_core::models::{ChurchMember, SentSms};
use parish_core::phone::normalize_phone;
use parish_storage::SmsLogStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What happened to one notification. Sending never fails the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SmsOutcome {
    Sent { request_id: String },
    Failed { error: String },
}

impl SmsOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SmsOutcome::Sent { .. })
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            SmsOutcome::Sent { request_id } => Some(request_id),
            SmsOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct SmsNotifier {
    provider: Arc<dyn SmsProvider>,
    log: Arc<dyn SmsLogStore>,
    templates: MessageTemplates,
    church_name: String,
    request_account_url: String,
}

impl std::fmt::Debug for SmsNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsNotifier")
            .field("provider", &self.provider.provider_name())
            .field("church_name", &self.church_name)
            .field("request_account_url", &self.request_account_url)
            .finish()
    }
}

impl SmsNotifier {
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        log: Arc<dyn SmsLogStore>,
        church_name: impl Into<String>,
        request_account_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            log,
            templates: MessageTemplates::new(),
            church_name: church_name.into(),
            request_account_url: request_account_url.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn SmsProvider> {
        &self.provider
    }

    /// Send `text` to `phone` and log it as `PENDING` once the gateway
    /// accepts it
    pub async fn notify(&self, recipient_id: Option<Uuid>, phone: &str, text: &str) -> SmsOutcome {
        let to = normalize_phone(phone);
        let receipt = match self.provider.send(&SmsMessage::new(to.clone(), text)).await {
            Ok(receipt) => receipt,
            Err(err) => {
                error!(to = %to, provider = self.provider.provider_name(), "SMS not sent: {}", err);
                return SmsOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        let entry = SentSms::pending(recipient_id, to.clone(), text, receipt.request_id.clone());
        if let Err(err) = self.log.record_sms(entry).await {
            warn!(to = %to, request_id = %receipt.request_id, "SMS sent but not logged: {}", err);
        }
        info!(to = %to, request_id = %receipt.request_id, "SMS sent");
        SmsOutcome::Sent {
            request_id: receipt.request_id,
        }
    }

    /// Welcome text for a newly registered member
    pub async fn welcome(&self, member: &ChurchMember) -> SmsOutcome {
        let text = self.templates.welcome(&self.context(member));
        self.notify_member(member, text).await
    }

    /// Approval text for a member moved from pending to active
    pub async fn approval(&self, member: &ChurchMember) -> SmsOutcome {
        let text = self.templates.approval(&self.context(member));
        self.notify_member(member, text).await
    }

    /// Same text to many numbers, one gateway call each
    pub async fn broadcast(&self, numbers: &[String], text: &str) -> Vec<(String, SmsOutcome)> {
        let mut results = Vec::with_capacity(numbers.len());
        for number in numbers {
            let outcome = self.notify(None, number, text).await;
            results.push((number.clone(), outcome));
        }
        results
    }

    pub async fn balance(&self) -> Result<String, SmsError> {
        self.provider.balance().await
    }

    /// Re-poll the gateway for every logged message and persist the status.
    /// Entries the gateway cannot report on keep their previous status.
    pub async fn refresh_statuses(&self) -> Result<Vec<SentSms>, SmsError> {
        let mut entries = self.log.list_sms().await?;
        for entry in &mut entries {
            match self
                .provider
                .delivery_status(&entry.phone_number, &entry.request_id)
                .await
            {
                Ok(status) => {
                    if status != entry.status {
                        self.log.update_sms_status(entry.id, &status).await?;
                        entry.status = status;
                    }
                }
                Err(err) => warn!(
                    request_id = %entry.request_id,
                    "Could not fetch delivery status: {}",
                    err
                ),
            }
        }
        Ok(entries)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, SmsError> {
        Ok(self.log.delete_sms(id).await?)
    }

    pub async fn delete_all(&self) -> Result<u64, SmsError> {
        Ok(self.log.delete_all_sms().await?)
    }

    fn context<'a>(&'a self, member: &'a ChurchMember) -> MemberMessage<'a> {
        MemberMessage {
            full_name: &member.full_name,
            member_id: &member.member_id,
            church_name: &self.church_name,
            request_account_url: &self.request_account_url,
        }
    }

    async fn notify_member(&self, member: &ChurchMember, text: Result<String, SmsError>) -> SmsOutcome {
        match text {
            Ok(text) => self.notify(Some(member.id), &member.phone_number, &text).await,
            Err(err) => {
                error!(member_id = %member.member_id, "SMS text could not be rendered: {}", err);
                SmsOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}
