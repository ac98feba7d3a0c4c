//! Sign-in across browser sessions: the last page is replayed until logout

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parish_auth::{Argon2Hasher, MemorySessionStore, PasswordHasher};
use parish_core::config::AppConfig;
use parish_core::models::{ChurchMember, Gender, MemberStatus, User, UserType};
use parish_http::session::session_id_from_set_cookie;
use parish_http::{router, AppState};
use parish_sms::MockSmsProvider;
use parish_storage::{LocalMediaStorage, Stores};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "mwanga-2024";

struct Harness {
    state: AppState,
    router: Router,
    _media: TempDir,
}

struct Reply {
    status: StatusCode,
    body: Value,
    cookie: Option<String>,
}

impl Harness {
    async fn new() -> Self {
        let media = TempDir::new().unwrap();
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::development());
        let state = AppState::new(
            AppConfig::testing(),
            Stores::in_memory(),
            hasher.clone(),
            Arc::new(LocalMediaStorage::new(media.path())),
            Arc::new(MockSmsProvider::new()),
            Arc::new(MemorySessionStore::new()),
        );

        let admin = User::new(
            "katibu",
            "+255754000999",
            UserType::Admin,
            hasher.hash_password(PASSWORD).unwrap(),
        );
        state.stores.users.insert_user(admin).await.unwrap();

        let member = ChurchMember::new("Maria Kimaro", Gender::Female, "+255754000123")
            .with_status(MemberStatus::Active);
        let member = state.stores.members.insert_member(member).await.unwrap();
        let account = User::new(
            "maria",
            "+255754000123",
            UserType::ChurchMember,
            hasher.hash_password(PASSWORD).unwrap(),
        )
        .with_church_member(member.id);
        state.stores.users.insert_user(account).await.unwrap();

        Self {
            router: router(state.clone()),
            state,
            _media: media,
        }
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie_name = &self.state.session_config.cookie_name;
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| session_id_from_set_cookie(v, cookie_name))
            .map(|id| format!("{}={}", cookie_name, id));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, body, cookie }
    }

    async fn get(&self, path: &str, cookie: &str) -> Reply {
        let request = Request::get(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&self, path: &str, cookie: Option<&str>, body: Value) -> Reply {
        let mut request = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Sign in from a fresh browser; returns the redirect and the session cookie
    async fn login(&self, username: &str) -> (String, String) {
        let reply = self
            .post(
                "/accounts/login/",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        let redirect = reply.body["redirect"].as_str().unwrap().to_string();
        (redirect, reply.cookie.unwrap())
    }
}

#[tokio::test]
async fn test_last_page_is_replayed_in_a_new_session() {
    let app = Harness::new().await;

    let (first, cookie) = app.login("katibu").await;
    assert_eq!(first, "/accounts/admin_dashboard/");

    let report = app.get("/members/report/", &cookie).await;
    assert_eq!(report.status, StatusCode::OK);

    let (replayed, _) = app.login("katibu").await;
    assert_eq!(replayed, "/members/report/");
}

#[tokio::test]
async fn test_ignored_pages_are_not_replayed() {
    let app = Harness::new().await;

    let (_, cookie) = app.login("maria").await;
    app.get("/accounts/member_dashboard/", &cookie).await;
    app.get("/news/public/", &cookie).await;

    let (replayed, _) = app.login("maria").await;
    assert_eq!(replayed, "/accounts/member_dashboard/");
}

#[tokio::test]
async fn test_logout_forgets_the_last_page() {
    let app = Harness::new().await;

    let (_, cookie) = app.login("katibu").await;
    app.get("/leaders/home/", &cookie).await;

    let logout = app.post("/accounts/logout/", Some(&cookie), json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["messages"][0]["text"], "You have been logged out.");

    let (after_logout, _) = app.login("katibu").await;
    assert_eq!(after_logout, "/accounts/admin_dashboard/");
}
