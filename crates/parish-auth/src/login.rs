//! Sign-in and sign-out

use crate::hashing::PasswordHasher;
use crate::redirect::{dashboard_for, Destination, IgnoredPaths};
use crate::session::SessionData;
use crate::{AuthError, AuthResult};
use parish_core::models::{LoginHistory, User, UserType};
use parish_core::FlashMessage;
use parish_storage::{LeaderStore, LoginHistoryStore, MemberStore, Stores, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const INACTIVE_ACCOUNT_MESSAGE: &str = "Your account is inactive. Contact admin for assistance.";

/// Submitted login form plus request metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl LoginRequest {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn from_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    pub login_id: Uuid,
    pub destination: Destination,
}

#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserStore>,
    members: Arc<dyn MemberStore>,
    leaders: Arc<dyn LeaderStore>,
    logins: Arc<dyn LoginHistoryStore>,
    hasher: Arc<dyn PasswordHasher>,
    ignored: IgnoredPaths,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService")
            .field("hasher", &self.hasher.hasher_name())
            .field("ignored", &self.ignored)
            .finish()
    }
}

impl LoginService {
    pub fn new(stores: &Stores, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users: stores.users.clone(),
            members: stores.members.clone(),
            leaders: stores.leaders.clone(),
            logins: stores.logins.clone(),
            hasher,
            ignored: IgnoredPaths::default(),
        }
    }

    pub fn with_ignored_paths(mut self, ignored: IgnoredPaths) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn ignored_paths(&self) -> &IgnoredPaths {
        &self.ignored
    }

    /// The signed-in user, if the session names one that still exists
    pub async fn current_user(&self, session: &SessionData) -> AuthResult<Option<User>> {
        match session.user_id {
            Some(id) => Ok(self.users.get_user(id).await?),
            None => Ok(None),
        }
    }

    /// Role dashboard, looking up the leader record behind the account
    pub async fn destination_for(&self, user: &User) -> AuthResult<Destination> {
        let leader = match (user.user_type, user.church_member_id) {
            (UserType::ChurchMember, Some(member_id)) => {
                self.leaders.find_leader_by_member(member_id).await?
            }
            _ => None,
        };
        Ok(dashboard_for(user, leader.as_ref()))
    }

    /// Where an already signed-in user who opens the login page goes
    pub async fn redirect_authenticated(
        &self,
        session: &SessionData,
        user: &User,
    ) -> AuthResult<Destination> {
        match self.ignored.filter(session.last_visited_path.as_deref()) {
            Some(path) => Ok(Destination::Path(path.to_string())),
            None => self.destination_for(user).await,
        }
    }

    pub async fn login(
        &self,
        session: &mut SessionData,
        request: LoginRequest,
    ) -> AuthResult<LoginOutcome> {
        let user = self.authenticate(&request.identifier, &request.password).await?;
        self.ensure_may_sign_in(&user).await?;

        let record = self
            .logins
            .record_login(LoginHistory::new(
                user.id,
                request.ip_address.clone(),
                request.user_agent.clone(),
            ))
            .await?;
        session.authenticate(user.id, record.id);

        let remembered = session.take_last_path();
        let replay = match self.ignored.filter(remembered.as_deref()) {
            Some(path) => Some(path.to_string()),
            None => self.previous_last_path(user.id, record.id).await?,
        };
        let destination = match replay {
            Some(path) => Destination::Path(path),
            None => self.destination_for(&user).await?,
        };

        tracing::info!(
            user = %user.username,
            ip = request.ip_address.as_deref().unwrap_or("-"),
            destination = %destination,
            "User signed in"
        );

        Ok(LoginOutcome {
            user,
            login_id: record.id,
            destination,
        })
    }

    /// Wipe the user's login history and the session, then send them to
    /// their dashboard (which bounces anonymous visitors to login)
    pub async fn logout(&self, session: &mut SessionData, user: &User) -> AuthResult<Destination> {
        let removed = self.logins.clear_login_history(user.id).await?;
        session.flush();
        session.push_flash(FlashMessage::success("You have been logged out."));
        tracing::info!(user = %user.username, removed, "User signed out");
        self.destination_for(user).await
    }

    /// Path remembered on the user's most recent login before `current_login_id`
    pub async fn previous_last_path(
        &self,
        user_id: Uuid,
        current_login_id: Uuid,
    ) -> AuthResult<Option<String>> {
        let previous = self.logins.previous_login(user_id, current_login_id).await?;
        Ok(previous
            .and_then(|record| record.last_visited_path)
            .filter(|path| self.ignored.filter(Some(path.as_str())).is_some()))
    }

    async fn authenticate(&self, identifier: &str, password: &str) -> AuthResult<User> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = match self.users.find_user_by_username(identifier).await? {
            Some(user) => Some(user),
            None if identifier.contains('@') => self.users.find_user_by_email(identifier).await?,
            None => None,
        };
        let Some(user) = user else {
            tracing::warn!(identifier, "Sign-in attempt for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if self.hasher.verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            tracing::warn!(user = %user.username, "Sign-in attempt with a wrong password");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Church-member accounts need an active member record; superusers skip it
    async fn ensure_may_sign_in(&self, user: &User) -> AuthResult<()> {
        if user.is_superuser || user.user_type != UserType::ChurchMember {
            return Ok(());
        }
        let member = match user.church_member_id {
            Some(id) => self.members.get_member(id).await?,
            None => None,
        };
        match member {
            Some(member) if member.is_active() => Ok(()),
            _ => Err(AuthError::user_disabled(INACTIVE_ACCOUNT_MESSAGE)),
        }
    }
}

/// Client address: the first `X-Forwarded-For` hop, else the peer address
pub fn client_ip(forwarded_for: Option<&str>, remote_addr: Option<&str>) -> Option<String> {
    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or(remote_addr)
        .map(str::to_string)
}
