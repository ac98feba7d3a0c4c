//! Cookie sessions and last-page tracking
//!
//! [`session_middleware`] loads the session named by the cookie (or starts
//! a blank one), resolves the signed-in user, remembers the page for
//! signed-in `GET` requests, and hands both to the handler through request
//! extensions. Once the handler is done the session is written back and the
//! cookie refreshed.

use crate::error::{HttpError, HttpResult};
use crate::response::Page;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use parish_auth::{SessionData, SessionId};
use parish_core::models::User;
use parish_core::FlashMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// The current browser session, shared between the middleware and the handler
#[derive(Debug, Clone)]
pub struct Session {
    data: Arc<Mutex<SessionData>>,
    renew: Arc<AtomicBool>,
}

impl Session {
    fn new(data: SessionData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            renew: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().await
    }

    /// Store the data under a fresh id once the request completes
    pub fn renew(&self) {
        self.renew.store(true, Ordering::SeqCst);
    }

    fn renew_requested(&self) -> bool {
        self.renew.load(Ordering::SeqCst)
    }

    pub async fn push_flash(&self, message: FlashMessage) {
        self.lock().await.push_flash(message);
    }

    /// Page carrying `data` and any flash messages still pending on the session
    pub async fn page<T>(&self, data: T) -> Page<T> {
        let pending = self.lock().await.take_flash();
        Page::new(data).with_messages(pending)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| HttpError::internal("Session middleware is not installed"))
    }
}

/// The signed-in user; rejects anonymous requests with 401
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(HttpError::Unauthenticated)
    }
}

/// The signed-in user, if any
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<CurrentUser>().map(|user| user.0.clone()),
        ))
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> HttpResult<Response> {
    let cookie_id = request
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| state.session_config.extract_session_id_from_cookie(cookies));

    let stored = match &cookie_id {
        Some(id) => state.sessions.get_session(id).await?,
        None => None,
    };
    let (mut session_id, mut data) = match (cookie_id, stored) {
        (Some(id), Some(data)) => (Some(id), data),
        _ => (None, SessionData::new()),
    };

    let user = state.login.current_user(&data).await?;
    if user.is_none() && data.is_authenticated() {
        tracing::debug!("Session names a user that no longer exists");
        data.flush();
    }
    if user.is_some() && request.method() == Method::GET {
        state.tracker.observe(&mut data, request.uri().path()).await?;
    }

    let session = Session::new(data);
    request.extensions_mut().insert(session.clone());
    if let Some(user) = user {
        request.extensions_mut().insert(CurrentUser(user));
    }

    let mut response = next.run(request).await;

    let data = session.lock().await.clone();
    let renewed = session.renew_requested();
    if renewed {
        if let Some(old) = session_id.take() {
            state.sessions.delete_session(&old).await?;
        }
    }
    if session_id.is_none() && is_blank(&data) {
        if renewed {
            set_cookie(&mut response, &state.session_config.clear_cookie_header())?;
        }
        return Ok(response);
    }

    let expires_at = state.session_config.expires_at();
    let id = match session_id {
        Some(id) => {
            state.sessions.update_session(&id, data, expires_at).await?;
            id
        }
        None => state.sessions.create_session(data, expires_at).await?,
    };
    set_cookie(&mut response, &state.session_config.create_cookie_header(&id))?;
    Ok(response)
}

/// Nothing worth a server-side session
fn is_blank(data: &SessionData) -> bool {
    !data.is_authenticated() && data.flash.is_empty() && data.last_visited_path.is_none()
}

fn set_cookie(response: &mut Response, cookie: &str) -> HttpResult<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|err| HttpError::internal(format!("Invalid session cookie: {}", err)))?;
    response.headers_mut().insert(SET_COOKIE, value);
    Ok(())
}

/// Session id carried by a `Set-Cookie` value, for clients and tests
pub fn session_id_from_set_cookie(set_cookie: &str, cookie_name: &str) -> Option<SessionId> {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix(cookie_name))
        .and_then(|rest| rest.strip_prefix('='))
        .and_then(|value| SessionId::from_string(value.to_string()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_sessions_are_not_stored() {
        let mut data = SessionData::new();
        assert!(is_blank(&data));

        data.push_flash(FlashMessage::success("You have been logged out."));
        assert!(!is_blank(&data));
    }

    #[test]
    fn test_session_id_from_set_cookie() {
        let id = SessionId::generate();
        let header = format!("session_id={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400", id);

        assert_eq!(session_id_from_set_cookie(&header, "session_id"), Some(id));
        assert_eq!(session_id_from_set_cookie(&header, "other"), None);
        assert_eq!(session_id_from_set_cookie("session_id=; Max-Age=0", "session_id"), None);
    }

    #[tokio::test]
    async fn test_page_drains_pending_flash() {
        let session = Session::new(SessionData::new());
        session.push_flash(FlashMessage::success("You have been logged out.")).await;

        let page = session.page(()).await;
        assert_eq!(page.messages.len(), 1);
        assert!(session.lock().await.flash.is_empty());
    }
}
