//! Server-side sessions keyed by a cookie

use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parish_core::{AppConfig, FlashMessage};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const SESSION_ID_LEN: usize = 32;

/// Opaque session identifier carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let id = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn from_string(value: String) -> AuthResult<Self> {
        if value.len() == SESSION_ID_LEN && value.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(value))
        } else {
            Err(AuthError::session_error("Malformed session id"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything kept between requests for one browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<Uuid>,
    /// Login record created when this session signed in
    pub login_id: Option<Uuid>,
    pub last_visited_path: Option<String>,
    pub flash: Vec<FlashMessage>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            user_id: None,
            login_id: None,
            last_visited_path: None,
            flash: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn authenticate(&mut self, user_id: Uuid, login_id: Uuid) {
        self.user_id = Some(user_id);
        self.login_id = Some(login_id);
    }

    /// Forget everything, including pending flash messages
    pub fn flush(&mut self) {
        *self = Self::new();
    }

    pub fn take_last_path(&mut self) -> Option<String> {
        self.last_visited_path.take()
    }

    pub fn push_flash(&mut self, message: FlashMessage) {
        self.flash.push(message);
    }

    pub fn take_flash(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.flash)
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}

/// Session persistence
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn create_session(
        &self,
        data: SessionData,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<SessionId>;

    /// Expired sessions read as absent
    async fn get_session(&self, id: &SessionId) -> AuthResult<Option<SessionData>>;

    async fn update_session(
        &self,
        id: &SessionId,
        data: SessionData,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()>;

    async fn delete_session(&self, id: &SessionId) -> AuthResult<()>;

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64>;
}

/// Process-local session storage
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, (SessionData, DateTime<Utc>)>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStore {
    async fn create_session(
        &self,
        data: SessionData,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<SessionId> {
        let id = SessionId::generate();
        self.sessions
            .write()
            .await
            .insert(id.clone(), (data, expires_at));
        Ok(id)
    }

    async fn get_session(&self, id: &SessionId) -> AuthResult<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(data, _)| data.clone()))
    }

    async fn update_session(
        &self,
        id: &SessionId,
        data: SessionData,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        self.sessions
            .write()
            .await
            .insert(id.clone(), (data, expires_at));
        Ok(())
    }

    async fn delete_session(&self, id: &SessionId) -> AuthResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

/// Cookie SameSite attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for CookieSameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CookieSameSite::Strict => write!(f, "Strict"),
            CookieSameSite::Lax => write!(f, "Lax"),
            CookieSameSite::None => write!(f, "None"),
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_http_only: bool,
    pub cookie_secure: bool,
    pub cookie_same_site: CookieSameSite,
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            cookie_path: "/".to_string(),
            cookie_http_only: true,
            cookie_secure: false,
            cookie_same_site: CookieSameSite::Lax,
            ttl: Duration::days(1),
        }
    }
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cookie_name: config.session_cookie_name.clone(),
            cookie_secure: config.environment.is_production(),
            ttl: Duration::minutes(config.session_ttl_minutes),
            ..Self::default()
        }
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    /// Find our session id in a `Cookie` header
    pub fn extract_session_id_from_cookie(&self, cookie_header: &str) -> Option<SessionId> {
        let prefix = format!("{}=", self.cookie_name);
        cookie_header
            .split(';')
            .map(str::trim)
            .filter_map(|cookie| cookie.strip_prefix(prefix.as_str()))
            .find_map(|value| SessionId::from_string(value.to_string()).ok())
    }

    /// `Set-Cookie` value for a live session
    pub fn create_cookie_header(&self, session_id: &SessionId) -> String {
        self.cookie_with_value(session_id.as_str(), self.ttl.num_seconds())
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie_header(&self) -> String {
        self.cookie_with_value("", 0)
    }

    fn cookie_with_value(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!("{}={}", self.cookie_name, value);
        cookie.push_str(&format!("; Path={}", self.cookie_path));
        if self.cookie_http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.cookie_same_site));
        cookie.push_str(&format!("; Max-Age={}", max_age));
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_extraction() {
        let config = SessionConfig::default();
        let id = SessionId::generate();
        let header = format!("csrftoken=abc; session_id={}; theme=dark", id);

        assert_eq!(config.extract_session_id_from_cookie(&header), Some(id));
        assert_eq!(config.extract_session_id_from_cookie("session_id=short"), None);
        assert_eq!(config.extract_session_id_from_cookie("other=1"), None);
    }

    #[test]
    fn test_cookie_header_attributes() {
        let config = SessionConfig::default().cookie_secure(true);
        let id = SessionId::generate();
        let header = config.create_cookie_header(&id);

        assert!(header.starts_with(&format!("session_id={}", id)));
        assert!(header.contains("; HttpOnly"));
        assert!(header.contains("; Secure"));
        assert!(header.contains("; Max-Age=86400"));
        assert!(config.clear_cookie_header().contains("Max-Age=0"));
    }

    #[test]
    fn test_flush_clears_state() {
        let mut data = SessionData::new();
        data.authenticate(Uuid::new_v4(), Uuid::new_v4());
        data.last_visited_path = Some("/members/".into());
        data.push_flash(FlashMessage::info("hello"));

        data.flush();
        assert!(!data.is_authenticated());
        assert!(data.last_visited_path.is_none());
        assert!(data.take_flash().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemorySessionStore::new();
        let live = store
            .create_session(SessionData::new(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        let expired = store
            .create_session(SessionData::new(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(store.get_session(&live).await.unwrap().is_some());
        assert!(store.get_session(&expired).await.unwrap().is_none());
        assert_eq!(store.cleanup_expired_sessions().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);

        store.delete_session(&live).await.unwrap();
        assert!(store.get_session(&live).await.unwrap().is_none());
    }
}
