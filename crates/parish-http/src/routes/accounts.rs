//! Sign-in, sign-out and member self-service

use super::FilePayload;
use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, MaybeUser, Session};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use parish_auth::{client_ip, IdentifiedMember, LoginRequest};
use parish_core::models::User;
use parish_core::FlashMessage;
use parish_validation::FormData;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email address
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberIdQuery {
    pub member_id: String,
}

pub async fn welcome(State(state): State<AppState>, session: Session) -> Page<Value> {
    session
        .page(json!({ "church_name": state.config.church_name }))
        .await
}

/// Signed-in visitors are sent on; everyone else gets the form
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
) -> HttpResult<Page<Value>> {
    let Some(user) = user else {
        return Ok(session.page(json!({ "authenticated": false })).await);
    };
    let destination = {
        let data = session.lock().await;
        state.login.redirect_authenticated(&data, &user).await?
    };
    Ok(session
        .page(json!({ "authenticated": true }))
        .await
        .redirect(destination.path()))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(current): MaybeUser,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(form): Json<LoginForm>,
) -> HttpResult<Page<Value>> {
    if current.is_some() {
        return login_page(State(state), session, MaybeUser(current)).await;
    }

    let forwarded_for = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());
    let remote = connect.map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request = LoginRequest::new(form.username, form.password)
        .from_client(client_ip(forwarded_for, remote.as_deref()), user_agent);

    let outcome = {
        let mut data = session.lock().await;
        state.login.login(&mut data, request).await?
    };
    session.renew();

    Ok(session
        .page(json!({ "user": outcome.user }))
        .await
        .redirect(outcome.destination.path()))
}

/// Clears the user's login history and the session
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Value>> {
    let destination = {
        let mut data = session.lock().await;
        state.login.logout(&mut data, &user).await?
    };
    session.renew();
    Ok(session.page(json!({})).await.redirect(destination.path()))
}

/// First step of an account request: who does this member id belong to
pub async fn identify_for_request(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MemberIdQuery>,
) -> HttpResult<Page<IdentifiedMember>> {
    let identified = state.accounts.identify_for_request(&query.member_id).await?;
    let greeting = FlashMessage::info(identified.greeting.clone());
    Ok(session.page(identified).await.with_message(greeting))
}

pub async fn request_account(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<FormData>,
) -> HttpResult<Page<User>> {
    let (user, flash) = state.accounts.request_account(&form).await?;
    Ok(session
        .page(user)
        .await
        .with_message(flash)
        .redirect("/accounts/login/"))
}

pub async fn identify_for_reset(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MemberIdQuery>,
) -> HttpResult<Page<IdentifiedMember>> {
    let identified = state.accounts.identify_for_reset(&query.member_id).await?;
    let greeting = FlashMessage::info(identified.greeting.clone());
    Ok(session.page(identified).await.with_message(greeting))
}

pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<FormData>,
) -> HttpResult<Page<User>> {
    let (user, flash) = state.accounts.reset_password(&form).await?;
    Ok(session
        .page(user)
        .await
        .with_message(flash)
        .redirect("/accounts/login/"))
}

pub async fn upload_profile_picture(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(file): Json<FilePayload>,
) -> HttpResult<Page<User>> {
    let data = file.decode()?;
    let user = state
        .accounts
        .upload_profile_picture(&user, &file.file_name, &data)
        .await?;
    let destination = state.login.destination_for(&user).await?;
    Ok(session
        .page(user)
        .await
        .with_message(FlashMessage::success("Profile picture uploaded successfully!"))
        .redirect(destination.path()))
}

pub async fn remove_profile_picture(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Value>> {
    state.accounts.remove_profile_picture(&user).await?;
    Ok(session.page(json!({ "success": true })).await)
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{TestApp, PASSWORD};
    use axum::http::StatusCode;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use parish_core::models::{ChurchMember, Gender, MemberStatus, Occupation};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_lands_on_role_dashboard() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        app.member_account("asha", Some(Occupation::Evangelist)).await;
        app.member_account("baraka", None).await;

        let (admin, _) = app.login("mchungaji", None).await;
        assert_eq!(admin.redirect(), Some("/accounts/admin_dashboard/"));
        assert!(admin.body["data"]["user"].get("password_hash").is_none());

        let (evangelist, _) = app.login("asha", None).await;
        assert_eq!(evangelist.redirect(), Some("/accounts/evangelist_dashboard/"));

        let (member, _) = app.login("baraka", None).await;
        assert_eq!(member.redirect(), Some("/accounts/member_dashboard/"));
    }

    #[tokio::test]
    async fn test_bad_credentials_and_inactive_member() {
        let app = TestApp::new();
        let user = app.member_account("asha", None).await;

        let wrong = app
            .post(
                "/accounts/login/",
                None,
                json!({ "username": "asha", "password": "not-the-password" }),
            )
            .await;
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.error_message(), "Invalid username/email or password.");

        let mut member = app
            .state
            .stores
            .members
            .get_member(user.church_member_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        member.status = MemberStatus::Inactive;
        app.state.stores.members.update_member(&member).await.unwrap();

        let inactive = app
            .post(
                "/accounts/login/",
                None,
                json!({ "username": "asha", "password": PASSWORD }),
            )
            .await;
        assert_eq!(inactive.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            inactive.error_message(),
            "Your account is inactive. Contact admin for assistance."
        );
    }

    #[tokio::test]
    async fn test_login_page_sends_signed_in_user_on() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let (_, cookie) = app.login("mchungaji", None).await;

        let report = app.get("/members/report/", Some(&cookie)).await;
        assert_eq!(report.status, StatusCode::OK);

        // opening the login page is itself an ignored path and clears the remembered page
        let page = app.get("/accounts/login/", Some(&cookie)).await;
        assert_eq!(page.redirect(), Some("/accounts/admin_dashboard/"));

        let session_id = cookie.split_once('=').unwrap().1.to_string();
        let session_id = parish_auth::SessionId::from_string(session_id).unwrap();
        let stored = app.state.sessions.get_session(&session_id).await.unwrap().unwrap();
        assert!(stored.last_visited_path.is_none());

        let anonymous = app.get("/accounts/login/", None).await;
        assert_eq!(anonymous.body["data"]["authenticated"], json!(false));
        assert!(anonymous.set_cookie.is_none());
    }

    #[tokio::test]
    async fn test_logout_flashes_and_ends_session() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        let (_, cookie) = app.login("mchungaji", None).await;

        let logout = app.post("/accounts/logout/", Some(&cookie), json!({})).await;
        assert_eq!(logout.status, StatusCode::OK);
        assert_eq!(logout.redirect(), Some("/accounts/admin_dashboard/"));
        assert_eq!(logout.messages(), vec!["You have been logged out.".to_string()]);

        let dashboard = app.get("/accounts/admin_dashboard/", Some(&cookie)).await;
        assert_eq!(dashboard.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_account_flow() {
        let app = TestApp::new();
        let member = ChurchMember::new("Neema Mushi", Gender::Female, "+255754000222")
            .with_status(MemberStatus::Active);
        let member = app.state.stores.members.insert_member(member).await.unwrap();

        let identify = app
            .get(
                &format!("/accounts/request-account/?member_id={}", member.member_id),
                None,
            )
            .await;
        assert_eq!(identify.status, StatusCode::OK);
        assert_eq!(
            identify.messages(),
            vec!["Well done, we identify you as Neema Mushi.".to_string()]
        );

        let created = app
            .post(
                "/accounts/request-account/",
                None,
                json!({
                    "member_id": member.member_id,
                    "username": "neema",
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::OK, "{}", created.body);
        assert_eq!(created.redirect(), Some("/accounts/login/"));

        let (signed_in, _) = app.login("neema", None).await;
        assert_eq!(signed_in.redirect(), Some("/accounts/member_dashboard/"));

        let unknown = app
            .get("/accounts/request-account/?member_id=NOPE000000", None)
            .await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_picture_upload_and_removal() {
        let app = TestApp::new();
        app.member_account("baraka", None).await;
        let (_, cookie) = app.login("baraka", None).await;

        let uploaded = app
            .post(
                "/accounts/upload_profile_picture/",
                Some(&cookie),
                json!({ "file_name": "me.jpg", "content": STANDARD.encode(b"jpeg") }),
            )
            .await;
        assert_eq!(uploaded.status, StatusCode::OK, "{}", uploaded.body);
        assert!(uploaded.body["data"]["profile_picture"]
            .as_str()
            .unwrap()
            .starts_with("profile_pictures/"));

        let removed = app
            .post("/accounts/remove_profile_picture/", Some(&cookie), json!({}))
            .await;
        assert_eq!(removed.body["data"]["success"], json!(true));

        let again = app
            .post("/accounts/remove_profile_picture/", Some(&cookie), json!({}))
            .await;
        assert_eq!(again.status, StatusCode::BAD_REQUEST);
        assert_eq!(again.error_message(), "No profile picture found");
    }
}
