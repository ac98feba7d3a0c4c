//! Parish register views for the office

use super::FilePayload;
use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use parish_auth::require_admin;
use parish_core::models::{ChurchMember, MemberDocument};
use parish_core::{FlashLevel, FlashMessage};
use parish_registry::{
    ListingQuery, MemberListing, MemberProfile, MemberSaved, MemberScope, MembersHome, MembersReport,
    NextStep,
};
use parish_validation::FormData;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const SIGNUP_SUBMITTED: &str =
    "Your signup request has been submitted successfully! It is pending approval.";

/// Where the office goes after saving a member
pub fn next_path(next: &NextStep) -> String {
    match next {
        NextStep::CreateLeader(id) => format!("/leaders/create/{}/", id),
        NextStep::MemberList => "/members/".to_string(),
        NextStep::MemberDetail(id) => format!("/members/detail/{}/", id),
    }
}

async fn saved_page(session: &Session, saved: MemberSaved) -> Page<ChurchMember> {
    let redirect = next_path(&saved.next);
    session
        .page(saved.member)
        .await
        .with_messages(saved.messages)
        .redirect(redirect)
}

/// Pending sign-ups first, then active members
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<MemberListing>> {
    require_admin(&user)?;
    let listing = state.members.list(MemberScope::Register, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn inactive_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<MemberListing>> {
    require_admin(&user)?;
    let listing = state.members.list(MemberScope::Inactive, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<MembersHome>> {
    require_admin(&user)?;
    Ok(session.page(state.members.home().await?).await)
}

pub async fn report(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<MembersReport>> {
    require_admin(&user)?;
    Ok(session.page(state.members.report().await?).await)
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(form): Json<FormData>,
) -> HttpResult<Page<ChurchMember>> {
    require_admin(&user)?;
    let saved = state.members.register_member(&form).await?;
    Ok(saved_page(&session, saved).await)
}

/// Public sign-up. The record always starts out pending approval.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(mut form): Json<FormData>,
) -> HttpResult<Page<Value>> {
    form.remove("status");
    let saved = state.members.register_member(&form).await?;
    let warnings = saved
        .messages
        .into_iter()
        .filter(|message| message.level != FlashLevel::Success);

    Ok(session
        .page(json!({ "member_id": saved.member.member_id }))
        .await
        .with_message(FlashMessage::success(SIGNUP_SUBMITTED))
        .with_messages(warnings)
        .redirect("/accounts/login/"))
}

pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<MemberProfile>> {
    require_admin(&user)?;
    Ok(session.page(state.members.profile(id).await?).await)
}

pub async fn update(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<FormData>,
) -> HttpResult<Page<ChurchMember>> {
    require_admin(&user)?;
    let saved = state.members.update_member(id, &form).await?;
    Ok(saved_page(&session, saved).await)
}

pub async fn approve(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<ChurchMember>> {
    require_admin(&user)?;
    let saved = state.members.approve_member(id).await?;
    Ok(saved_page(&session, saved).await)
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<Value>> {
    require_admin(&user)?;
    let flash = state.members.delete_member(id).await?;
    Ok(session
        .page(json!({ "deleted": id }))
        .await
        .with_message(flash)
        .redirect("/members/"))
}

/// A passport (the default) or certificate scan sent inline
#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    #[serde(default)]
    pub document: MemberDocument,
    pub file: FilePayload,
}

pub async fn upload_document(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(upload): Json<DocumentUpload>,
) -> HttpResult<Page<ChurchMember>> {
    require_admin(&user)?;
    let data = upload.file.decode()?;
    let (member, flash) = state
        .members
        .upload_document(id, upload.document, &upload.file.file_name, &data)
        .await?;
    Ok(session
        .page(member)
        .await
        .with_message(flash)
        .redirect("/members/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::TestApp;
    use crate::routes::testing::PASSWORD;
    use axum::http::StatusCode;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use parish_core::models::MemberStatus;

    fn member_form(name: &str) -> Value {
        json!({
            "full_name": name,
            "gender": "Female",
            "phone_number": "+255754000321",
            "is_baptised": true,
        })
    }

    #[test]
    fn test_next_path() {
        let id = Uuid::new_v4();
        assert_eq!(next_path(&NextStep::CreateLeader(id)), format!("/leaders/create/{}/", id));
        assert_eq!(next_path(&NextStep::MemberList), "/members/");
        assert_eq!(next_path(&NextStep::MemberDetail(id)), format!("/members/detail/{}/", id));
    }

    #[tokio::test]
    async fn test_register_and_approve_member() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let (_, cookie) = app.login("mchungaji", None).await;

        let created = app
            .post("/members/create/", Some(&cookie), member_form("Rehema Said"))
            .await;
        assert_eq!(created.status, StatusCode::OK, "{}", created.body);
        assert_eq!(created.redirect(), Some("/members/"));
        assert_eq!(
            created.messages(),
            vec!["Church member saved successfully & SMS notification sent!".to_string()]
        );
        assert_eq!(created.body["data"]["status"], "Pending");
        let id = created.body["data"]["id"].as_str().unwrap().to_string();

        let listing = app.get("/members/", Some(&cookie)).await;
        assert_eq!(listing.body["data"]["members"].as_array().unwrap().len(), 1);

        let approved = app
            .post(&format!("/members/approve/{}/", id), Some(&cookie), json!({}))
            .await;
        assert_eq!(approved.status, StatusCode::OK);
        assert_eq!(approved.body["data"]["status"], "Active");
        assert_eq!(
            approved.messages(),
            vec!["Rehema Said has been approved and notified via SMS!".to_string()]
        );
        assert_eq!(app.provider.sent().await.len(), 2);

        let again = app
            .post(&format!("/members/approve/{}/", id), Some(&cookie), json!({}))
            .await;
        assert_eq!(again.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_leader_flag_redirects_to_leader_form() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let (_, cookie) = app.login("mchungaji", None).await;

        let mut form = member_form("Petro Ally");
        form["is_this_church_member_a_leader"] = json!(true);
        let created = app.post("/members/create/", Some(&cookie), form).await;
        let id = created.body["data"]["id"].as_str().unwrap();
        assert_eq!(created.redirect(), Some(format!("/leaders/create/{}/", id).as_str()));
    }

    #[tokio::test]
    async fn test_invalid_sacraments_are_rejected() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let (_, cookie) = app.login("mchungaji", None).await;

        let mut form = member_form("Zawadi Omari");
        form["is_married"] = json!(true);
        let rejected = app.post("/members/create/", Some(&cookie), form).await;
        assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
        let stored = app.state.members.home().await.unwrap();
        assert_eq!(stored, MembersHome::default());
    }

    #[tokio::test]
    async fn test_public_signup_stays_pending() {
        let app = TestApp::new();
        let mut form = member_form("Halima Juma");
        form["status"] = json!("Active");

        let signup = app.post("/members/signup/", None, form).await;
        assert_eq!(signup.status, StatusCode::OK, "{}", signup.body);
        assert_eq!(signup.messages(), vec![SIGNUP_SUBMITTED.to_string()]);

        let members = app
            .state
            .members
            .list(MemberScope::Register, &ListingQuery::default())
            .await
            .unwrap();
        assert_eq!(members.members[0].member.status, MemberStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_and_delete_member() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let user = app.member_account("baraka", None).await;
        let id = user.church_member_id.unwrap();
        let (_, cookie) = app.login("mchungaji", None).await;

        let mut form = member_form("Baraka Mollel");
        form["status"] = json!("Inactive");
        let updated = app
            .post(&format!("/members/update/{}/", id), Some(&cookie), form)
            .await;
        assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
        assert_eq!(updated.redirect(), Some(format!("/members/detail/{}/", id).as_str()));

        let inactive = app.get("/members/inactive/", Some(&cookie)).await;
        assert_eq!(inactive.body["data"]["members"].as_array().unwrap().len(), 1);

        let deleted = app
            .post(&format!("/members/delete/{}/", id), Some(&cookie), json!({}))
            .await;
        assert_eq!(
            deleted.messages(),
            vec!["Church member 'Baraka Mollel' deleted successfully!".to_string()]
        );

        let missing = app.get(&format!("/members/detail/{}/", id), Some(&cookie)).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let account = app.state.stores.users.get_user(user.id).await.unwrap();
        assert!(account.is_none());
        let relogin = app
            .post(
                "/accounts/login/",
                None,
                json!({ "username": "baraka", "password": PASSWORD }),
            )
            .await;
        assert_eq!(relogin.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_passport_and_certificate() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let user = app.member_account("baraka", None).await;
        let id = user.church_member_id.unwrap();
        let (_, cookie) = app.login("mchungaji", None).await;
        let path = format!("/members/upload_passport/{}/", id);

        let passport = app
            .post(
                &path,
                Some(&cookie),
                json!({ "file": { "file_name": "baraka.jpg", "content": STANDARD.encode(b"jpeg") } }),
            )
            .await;
        assert_eq!(passport.status, StatusCode::OK, "{}", passport.body);
        assert_eq!(passport.messages(), vec!["Passport uploaded successfully!".to_string()]);
        assert_eq!(passport.redirect(), Some("/members/"));
        let stored = passport.body["data"]["passport"].as_str().unwrap().to_string();
        assert_eq!(
            app.state.media.get(&stored).await.unwrap(),
            Some(b"jpeg".to_vec())
        );

        let certificate = app
            .post(
                &path,
                Some(&cookie),
                json!({
                    "document": "confirmation_certificate",
                    "file": { "file_name": "kipaimara.pdf", "content": STANDARD.encode(b"pdf") },
                }),
            )
            .await;
        assert_eq!(certificate.status, StatusCode::OK, "{}", certificate.body);
        assert_eq!(certificate.body["data"]["passport"], stored.as_str());
        assert!(certificate.body["data"]["confirmation_certificate"].is_string());

        let (_, member_cookie) = app.login("baraka", None).await;
        let denied = app
            .post(
                &path,
                Some(&member_cookie),
                json!({ "file": { "file_name": "x.jpg", "content": STANDARD.encode(b"x") } }),
            )
            .await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_views_need_admin() {
        let app = TestApp::new();
        app.member_account("baraka", None).await;
        let (_, cookie) = app.login("baraka", None).await;

        assert_eq!(app.get("/members/", Some(&cookie)).await.status, StatusCode::FORBIDDEN);
        assert_eq!(app.get("/members/", None).await.status, StatusCode::UNAUTHORIZED);
    }
}
