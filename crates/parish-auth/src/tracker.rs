//! Remembers the last page a signed-in user opened

use crate::redirect::IgnoredPaths;
use crate::session::SessionData;
use crate::AuthResult;
use parish_core::models::LAST_PATH_MAX_LEN;
use parish_storage::LoginHistoryStore;
use std::sync::Arc;

/// Runs on every request of a signed-in user.
///
/// Ignored paths (login, account requests, the public pages) clear the
/// remembered path; any other path is kept both on the session and on the
/// user's most recent login record so it survives the browser session.
/// Paths too long for the login record stay on the session only.
#[derive(Clone)]
pub struct LastPathTracker {
    logins: Arc<dyn LoginHistoryStore>,
    ignored: IgnoredPaths,
}

impl std::fmt::Debug for LastPathTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LastPathTracker")
            .field("ignored", &self.ignored)
            .finish()
    }
}

impl LastPathTracker {
    pub fn new(logins: Arc<dyn LoginHistoryStore>, ignored: IgnoredPaths) -> Self {
        Self { logins, ignored }
    }

    pub fn ignored(&self) -> &IgnoredPaths {
        &self.ignored
    }

    pub async fn observe(&self, session: &mut SessionData, path: &str) -> AuthResult<()> {
        let Some(user_id) = session.user_id else {
            return Ok(());
        };

        if self.ignored.contains(path) {
            session.last_visited_path = None;
            return Ok(());
        }

        session.last_visited_path = Some(path.to_string());
        if path.chars().count() > LAST_PATH_MAX_LEN {
            return Ok(());
        }
        if let Some(latest) = self.logins.latest_login(user_id).await? {
            self.logins.set_last_visited_path(latest.id, path).await?;
            tracing::debug!(user_id = %user_id, path, "Remembered last visited path");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parish_core::models::LoginHistory;
    use parish_storage::MemoryStore;
    use uuid::Uuid;

    fn tracker(store: &Arc<MemoryStore>) -> LastPathTracker {
        LastPathTracker::new(store.clone(), IgnoredPaths::default())
    }

    #[tokio::test]
    async fn test_anonymous_requests_are_not_tracked() {
        let store = Arc::new(MemoryStore::new());
        let mut session = SessionData::new();

        tracker(&store).observe(&mut session, "/members/").await.unwrap();
        assert!(session.last_visited_path.is_none());
    }

    #[tokio::test]
    async fn test_path_is_kept_on_session_and_latest_login() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let login = store
            .record_login(LoginHistory::new(user_id, None, None))
            .await
            .unwrap();
        let mut session = SessionData::new();
        session.authenticate(user_id, login.id);

        tracker(&store)
            .observe(&mut session, "/evangelist/members/")
            .await
            .unwrap();

        assert_eq!(session.last_visited_path.as_deref(), Some("/evangelist/members/"));
        let latest = store.latest_login(user_id).await.unwrap().unwrap();
        assert_eq!(latest.last_visited_path.as_deref(), Some("/evangelist/members/"));
    }

    #[tokio::test]
    async fn test_ignored_path_clears_session_only() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let login = store
            .record_login(LoginHistory::new(user_id, None, None))
            .await
            .unwrap();
        let mut session = SessionData::new();
        session.authenticate(user_id, login.id);
        let tracker = tracker(&store);

        tracker.observe(&mut session, "/news/").await.unwrap();
        tracker.observe(&mut session, "/accounts/login/").await.unwrap();

        assert!(session.last_visited_path.is_none());
        let latest = store.latest_login(user_id).await.unwrap().unwrap();
        assert_eq!(latest.last_visited_path.as_deref(), Some("/news/"));
    }

    #[tokio::test]
    async fn test_overlong_path_keeps_previous_record() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let login = store
            .record_login(LoginHistory::new(user_id, None, None))
            .await
            .unwrap();
        let mut session = SessionData::new();
        session.authenticate(user_id, login.id);
        let tracker = tracker(&store);
        let long_path = format!("/members/?name={}", "a".repeat(LAST_PATH_MAX_LEN));

        tracker.observe(&mut session, "/members/home/").await.unwrap();
        tracker.observe(&mut session, &long_path).await.unwrap();

        assert_eq!(session.last_visited_path.as_deref(), Some(long_path.as_str()));
        let latest = store.latest_login(user_id).await.unwrap().unwrap();
        assert_eq!(latest.last_visited_path.as_deref(), Some("/members/home/"));
    }

    #[tokio::test]
    async fn test_without_login_record_only_session_changes() {
        let store = Arc::new(MemoryStore::new());
        let mut session = SessionData::new();
        session.authenticate(Uuid::new_v4(), Uuid::new_v4());

        tracker(&store).observe(&mut session, "/sms/").await.unwrap();
        assert_eq!(session.last_visited_path.as_deref(), Some("/sms/"));
    }
}
