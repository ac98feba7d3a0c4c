//! Route table
//!
//! Paths follow the parish office's URL layout. Admin views need an `ADMIN`
//! account or a superuser; evangelist and secretary views go through the
//! occupation gate.

pub mod accounts;
pub mod dashboards;
pub mod evangelist;
pub mod leaders;
pub mod members;
pub mod news;
pub mod sms;

use crate::error::{HttpError, HttpResult};
use crate::session::session_middleware;
use crate::state::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parish_core::models::MediaType;
use parish_registry::NewsUpload;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(accounts::welcome))
        // accounts
        .route("/accounts/welcome/page/", get(accounts::welcome))
        .route("/accounts/login/", get(accounts::login_page).post(accounts::login))
        .route("/accounts/logout/", get(accounts::logout).post(accounts::logout))
        .route(
            "/accounts/request-account/",
            get(accounts::identify_for_request).post(accounts::request_account),
        )
        .route(
            "/accounts/forgot-password/",
            get(accounts::identify_for_reset).post(accounts::reset_password),
        )
        .route("/accounts/upload_profile_picture/", post(accounts::upload_profile_picture))
        .route("/accounts/remove_profile_picture/", post(accounts::remove_profile_picture))
        // dashboards
        .route("/accounts/admin_dashboard/", get(dashboards::admin))
        .route("/accounts/pastor_dashboard/", get(dashboards::leader))
        .route("/accounts/evangelist_dashboard/", get(dashboards::leader))
        .route("/accounts/secretary_dashboard/", get(dashboards::leader))
        .route("/accounts/accountant_dashboard/", get(dashboards::leader))
        .route("/accounts/member_dashboard/", get(dashboards::member))
        // members (admin)
        .route("/members/", get(members::list))
        .route("/members/inactive/", get(members::inactive_list))
        .route("/members/home/", get(members::home))
        .route("/members/report/", get(members::report))
        .route("/members/create/", post(members::create))
        .route("/members/signup/", post(members::signup))
        .route("/members/detail/:id/", get(members::detail))
        .route("/members/update/:id/", post(members::update))
        .route("/members/approve/:id/", post(members::approve))
        .route("/members/delete/:id/", post(members::delete))
        .route("/members/upload_passport/:id/", post(members::upload_document))
        // leaders (admin)
        .route("/leaders/", get(leaders::list))
        .route("/leaders/inactive/", get(leaders::inactive_list))
        .route("/leaders/home/", get(leaders::home))
        .route("/leaders/create/:member_id/", post(leaders::create_from_member))
        .route("/leaders/detail/:id/", get(leaders::detail))
        // sms (admin)
        .route("/sms/status/", get(sms::status))
        .route("/sms/broadcast/", post(sms::broadcast))
        .route("/sms/delete/:id/", post(sms::delete))
        .route("/sms/delete_all/", post(sms::delete_all))
        .route("/secretary/sms/status/", get(sms::secretary_status))
        .route("/secretary/sms/delete/:id/", post(sms::secretary_delete))
        .route("/secretary/sms/delete_all/", post(sms::secretary_delete_all))
        // evangelist views
        .route("/evangelist/details/", get(evangelist::details))
        .route("/evangelist/members/", get(evangelist::member_list))
        .route("/evangelist/members/inactive/", get(evangelist::inactive_member_list))
        .route("/evangelist/members/home/", get(evangelist::members_home))
        .route("/evangelist/members/detail/:id/", get(evangelist::member_detail))
        .route("/evangelist/leaders/", get(evangelist::leader_list))
        .route("/evangelist/leaders/inactive/", get(evangelist::inactive_leader_list))
        .route("/evangelist/leaders/home/", get(evangelist::leaders_home))
        .route("/evangelist/leaders/detail/:id/", get(evangelist::leader_detail))
        .route("/evangelist/news/", get(news::list).post(news::create))
        .route("/evangelist/news/home/", get(news::home))
        .route("/evangelist/news/detail/:id/", get(news::detail))
        .route("/evangelist/news/update/:id/", post(news::update))
        .route("/evangelist/news/delete/:id/", post(news::delete))
        // public
        .route("/news/public/", get(news::public_list))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A file sent inline in a JSON body
#[derive(Debug, Clone, Deserialize)]
pub struct FilePayload {
    pub file_name: String,
    /// Base64 (standard alphabet) file content
    pub content: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

impl FilePayload {
    pub fn decode(&self) -> HttpResult<Vec<u8>> {
        STANDARD.decode(self.content.trim()).map_err(|_| {
            HttpError::bad_request(format!("{} is not valid base64 content", self.file_name))
        })
    }

    pub fn into_upload(self) -> HttpResult<NewsUpload> {
        let data = self.decode()?;
        let upload = NewsUpload::new(self.file_name, data);
        Ok(match self.media_type {
            Some(media_type) => upload.with_media_type(media_type),
            None => upload,
        })
    }
}
