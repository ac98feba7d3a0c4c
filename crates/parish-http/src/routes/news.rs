//! News posts: managed by the evangelist, readable by everyone

use super::FilePayload;
use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use parish_registry::{NewsRow, NewsUpload};
use parish_storage::NewsWithMedia;
use parish_validation::FormData;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

const CREATE_OR_UPDATE_DENIED: &str = "Only Evangelists can create or update news.";

/// Title and content fields plus inline attachments
#[derive(Debug, Deserialize)]
pub struct NewsPayload {
    #[serde(default)]
    pub media: Vec<FilePayload>,
    #[serde(flatten)]
    pub form: FormData,
}

impl NewsPayload {
    fn into_parts(self) -> HttpResult<(FormData, Vec<NewsUpload>)> {
        let uploads = self
            .media
            .into_iter()
            .map(FilePayload::into_upload)
            .collect::<HttpResult<Vec<_>>>()?;
        Ok((self.form, uploads))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsHome {
    pub total_news: usize,
    pub latest: Option<NewsRow>,
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Vec<NewsRow>>> {
    state
        .evangelist_gate("Only Evangelists can access the news list.")
        .check(&user)
        .await?;
    Ok(session.page(state.news.list().await?).await)
}

pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<NewsHome>> {
    state
        .evangelist_gate("Only Evangelists can view the news home.")
        .check(&user)
        .await?;
    let news = state.news.list().await?;
    Ok(session
        .page(NewsHome {
            total_news: news.len(),
            latest: news.into_iter().next(),
        })
        .await)
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewsPayload>,
) -> HttpResult<Page<NewsWithMedia>> {
    state.evangelist_gate(CREATE_OR_UPDATE_DENIED).check(&user).await?;
    let (form, uploads) = payload.into_parts()?;
    let (news, flash) = state.news.create(&form, uploads).await?;
    Ok(session
        .page(news)
        .await
        .with_message(flash)
        .redirect("/evangelist/news/"))
}

pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<NewsWithMedia>> {
    state
        .evangelist_gate("Only Evangelists can view news details.")
        .check(&user)
        .await?;
    Ok(session.page(state.news.get(id).await?).await)
}

/// Replaces the post's attachments with the ones sent
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewsPayload>,
) -> HttpResult<Page<NewsWithMedia>> {
    state.evangelist_gate(CREATE_OR_UPDATE_DENIED).check(&user).await?;
    let (form, uploads) = payload.into_parts()?;
    let (news, flash) = state.news.update(id, &form, uploads).await?;
    Ok(session
        .page(news)
        .await
        .with_message(flash)
        .redirect("/evangelist/news/"))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<Value>> {
    state
        .evangelist_gate("Only Evangelists can delete news.")
        .check(&user)
        .await?;
    let flash = state.news.delete(id).await?;
    Ok(session
        .page(json!({ "deleted": id }))
        .await
        .with_message(flash)
        .redirect("/evangelist/news/"))
}

/// Newest posts for the public site
pub async fn public_list(State(state): State<AppState>, session: Session) -> HttpResult<Page<Vec<NewsRow>>> {
    Ok(session.page(state.news.list().await?).await)
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::TestApp;
    use axum::http::StatusCode;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use parish_core::models::Occupation;
    use serde_json::json;

    #[tokio::test]
    async fn test_news_lifecycle() {
        let app = TestApp::new();
        app.member_account("asha", Some(Occupation::Evangelist)).await;
        let (_, cookie) = app.login("asha", None).await;

        let created = app
            .post(
                "/evangelist/news/",
                Some(&cookie),
                json!({
                    "title": "Harambee ya ujenzi",
                    "content": "Jumapili baada ya misa ya pili.",
                    "media": [{ "file_name": "bango.png", "content": STANDARD.encode(b"png") }],
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::OK, "{}", created.body);
        assert_eq!(created.messages(), vec!["News post created successfully!".to_string()]);
        assert_eq!(created.body["data"]["media"][0]["media_type"], "image");
        let id = created.body["data"]["news"]["id"].as_str().unwrap().to_string();

        let updated = app
            .post(
                &format!("/evangelist/news/update/{}/", id),
                Some(&cookie),
                json!({ "title": "Harambee", "content": "Imeahirishwa." }),
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
        assert!(updated.body["data"]["media"].as_array().unwrap().is_empty());

        let public = app.get("/news/public/", None).await;
        assert_eq!(public.body["data"][0]["news"]["title"], "Harambee");

        let home = app.get("/evangelist/news/home/", Some(&cookie)).await;
        assert_eq!(home.body["data"]["total_news"], 1);

        let deleted = app
            .post(&format!("/evangelist/news/delete/{}/", id), Some(&cookie), json!({}))
            .await;
        assert_eq!(
            deleted.messages(),
            vec!["News post and all associated media deleted successfully!".to_string()]
        );
        let missing = app
            .get(&format!("/evangelist/news/detail/{}/", id), Some(&cookie))
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_news_requires_evangelist() {
        let app = TestApp::new();
        app.member_account("juma", Some(Occupation::ChoirLeader)).await;
        let (_, cookie) = app.login("juma", None).await;

        let denied = app
            .post(
                "/evangelist/news/",
                Some(&cookie),
                json!({ "title": "Tangazo", "content": "..." }),
            )
            .await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
        assert_eq!(
            denied.error_message(),
            "Access denied: Only Evangelists can create or update news."
        );
    }

    #[tokio::test]
    async fn test_news_needs_title_and_valid_media() {
        let app = TestApp::new();
        app.member_account("asha", Some(Occupation::Evangelist)).await;
        let (_, cookie) = app.login("asha", None).await;

        let missing_title = app
            .post("/evangelist/news/", Some(&cookie), json!({ "content": "..." }))
            .await;
        assert_eq!(missing_title.status, StatusCode::UNPROCESSABLE_ENTITY);

        let bad_media = app
            .post(
                "/evangelist/news/",
                Some(&cookie),
                json!({
                    "title": "Tangazo",
                    "content": "...",
                    "media": [{ "file_name": "x.pdf", "content": "not base64!" }],
                }),
            )
            .await;
        assert_eq!(bad_media.status, StatusCode::BAD_REQUEST);
    }
}
