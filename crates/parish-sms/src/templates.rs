//! Texts sent to members

use crate::SmsError;
use serde::Serialize;
use tinytemplate::TinyTemplate;

const WELCOME: &str = "Habari {full_name}, karibu katika application yetu ya {church_name}, kama unatumia smartphone unaweza kupata akaunti yako mwenyewe kwa kutumia utambulisho wako ID (Usimpe yeyote!!) {member_id}, kwa kutumia link {request_account_url}";

const APPROVAL: &str = "Congratulations, you have been approved to join our church {church_name}, now you are an active member, you can proceed using our services if you have a smartphone using the link below to request your account, use your id {member_id} to request an account since you are already an active member\n{request_account_url}";

/// Values substituted into every member message
#[derive(Debug, Clone, Serialize)]
pub struct MemberMessage<'a> {
    pub full_name: &'a str,
    pub member_id: &'a str,
    pub church_name: &'a str,
    pub request_account_url: &'a str,
}

/// Renders the member notification texts
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageTemplates;

impl MessageTemplates {
    pub fn new() -> Self {
        Self
    }

    /// Sent when the office registers a new member
    pub fn welcome(&self, context: &MemberMessage<'_>) -> Result<String, SmsError> {
        render("welcome", WELCOME, context)
    }

    /// Sent when a pending member is approved
    pub fn approval(&self, context: &MemberMessage<'_>) -> Result<String, SmsError> {
        render("approval", APPROVAL, context)
    }
}

// TinyTemplate is neither Send nor Sync, so it lives only for one render
fn render<C: Serialize>(name: &str, template: &str, context: &C) -> Result<String, SmsError> {
    let mut templates = TinyTemplate::new();
    templates.set_default_formatter(&tinytemplate::format_unescaped);
    templates.add_template(name, template)?;
    Ok(templates.render(name, context)?)
}
