//! Sent-message log and gateway tools
//!
//! The office uses `/sms/...`; the parish council secretary gets the same
//! log views under `/secretary/sms/...`.

use crate::error::{HttpError, HttpResult};
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use parish_auth::require_admin;
use parish_core::models::SentSms;
use parish_core::phone::to_international;
use parish_core::FlashMessage;
use parish_sms::SmsOutcome;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct SmsStatusPage {
    /// Gateway credit, or the reason it could not be fetched
    pub balance: String,
    pub total_sms: usize,
    pub messages: Vec<SentSms>,
}

const OFFICE_STATUS_PATH: &str = "/sms/status/";
const SECRETARY_STATUS_PATH: &str = "/secretary/sms/status/";

/// Balance plus every logged message with a freshly polled status
pub async fn status(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<SmsStatusPage>> {
    require_admin(&user)?;
    status_page(&state, &session).await
}

pub async fn secretary_status(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<SmsStatusPage>> {
    state.secretary_gate().check(&user).await?;
    status_page(&state, &session).await
}

async fn status_page(state: &AppState, session: &Session) -> HttpResult<Page<SmsStatusPage>> {
    let balance = match state.sms.balance().await {
        Ok(balance) => balance,
        Err(err) => {
            tracing::warn!("Could not fetch SMS balance: {}", err);
            format!("Error fetching balance: {}", err)
        }
    };
    let messages = state.sms.refresh_statuses().await?;

    Ok(session
        .page(SmsStatusPage {
            balance,
            total_sms: messages.len(),
            messages,
        })
        .await)
}

#[derive(Debug, Deserialize)]
pub struct BroadcastForm {
    pub numbers: Vec<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResult {
    pub number: String,
    #[serde(flatten)]
    pub outcome: SmsOutcome,
}

pub async fn broadcast(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(form): Json<BroadcastForm>,
) -> HttpResult<Page<Vec<BroadcastResult>>> {
    require_admin(&user)?;
    let numbers: Vec<String> = form
        .numbers
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(to_international)
        .collect();
    if numbers.is_empty() || form.message.trim().is_empty() {
        return Err(HttpError::bad_request("Recipients and message text are required."));
    }

    let results: Vec<BroadcastResult> = state
        .sms
        .broadcast(&numbers, form.message.trim())
        .await
        .into_iter()
        .map(|(number, outcome)| BroadcastResult { number, outcome })
        .collect();
    let sent = results.iter().filter(|r| r.outcome.is_sent()).count();

    let mut page = session.page(Vec::new()).await;
    page = page.with_message(FlashMessage::success(format!(
        "SMS sent to {} of {} recipients.",
        sent,
        results.len()
    )));
    if sent < results.len() {
        page = page.with_message(FlashMessage::warning(
            "Some messages could not be sent. Check the gateway balance.",
        ));
    }
    page.data = results;
    Ok(page.redirect(OFFICE_STATUS_PATH))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<Value>> {
    require_admin(&user)?;
    delete_one(&state, &session, id, OFFICE_STATUS_PATH).await
}

pub async fn secretary_delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<Value>> {
    state.secretary_gate().check(&user).await?;
    delete_one(&state, &session, id, SECRETARY_STATUS_PATH).await
}

async fn delete_one(state: &AppState, session: &Session, id: Uuid, back: &str) -> HttpResult<Page<Value>> {
    if !state.sms.delete(id).await? {
        return Err(HttpError::not_found("SMS not found"));
    }
    Ok(session
        .page(json!({ "deleted": id }))
        .await
        .with_message(FlashMessage::success("SMS deleted successfully!"))
        .redirect(back))
}

pub async fn delete_all(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Value>> {
    require_admin(&user)?;
    delete_everything(&state, &session, OFFICE_STATUS_PATH).await
}

pub async fn secretary_delete_all(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Value>> {
    state.secretary_gate().check(&user).await?;
    delete_everything(&state, &session, SECRETARY_STATUS_PATH).await
}

async fn delete_everything(state: &AppState, session: &Session, back: &str) -> HttpResult<Page<Value>> {
    let deleted = state.sms.delete_all().await?;
    Ok(session
        .page(json!({ "deleted": deleted }))
        .await
        .with_message(FlashMessage::success("All SMS messages deleted successfully!"))
        .redirect(back))
}
