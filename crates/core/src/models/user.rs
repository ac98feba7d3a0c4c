//! Login accounts and their sign-in history

use crate::errors::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Maximum stored length of a remembered path
pub const LAST_PATH_MAX_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "CHURCH_MEMBER")]
    ChurchMember,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "ADMIN",
            UserType::ChurchMember => "CHURCH_MEMBER",
        }
    }
}

impl Default for UserType {
    fn default() -> Self {
        UserType::ChurchMember
    }
}

impl FromStr for UserType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserType::Admin),
            "CHURCH_MEMBER" => Ok(UserType::ChurchMember),
            other => Err(CoreError::invalid_value("user_type", other)),
        }
    }
}

/// A login account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub user_type: UserType,
    pub is_superuser: bool,
    pub church_member_id: Option<Uuid>,
    pub profile_picture: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_agreed_to_terms_and_conditions: bool,
    pub date_created: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        phone_number: impl Into<String>,
        user_type: UserType,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            phone_number: phone_number.into(),
            user_type,
            is_superuser: false,
            church_member_id: None,
            profile_picture: None,
            password_hash: password_hash.into(),
            is_agreed_to_terms_and_conditions: false,
            date_created: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_church_member(mut self, church_member_id: Uuid) -> Self {
        self.church_member_id = Some(church_member_id);
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn is_admin_or_superuser(&self) -> bool {
        self.is_superuser || self.user_type == UserType::Admin
    }

    /// Enforce the account/member link before persisting: admins never carry
    /// a member link, church-member accounts must have one.
    pub fn normalize_for_save(&mut self) -> CoreResult<()> {
        match self.user_type {
            UserType::Admin => {
                self.church_member_id = None;
                Ok(())
            }
            UserType::ChurchMember if self.church_member_id.is_none() => Err(CoreError::validation(
                "CHURCH_MEMBER users must be linked to a valid ChurchMember.",
            )),
            UserType::ChurchMember => Ok(()),
        }
    }
}

/// One successful sign-in. The latest record carries the page the user was on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login_time: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub last_visited_path: Option<String>,
}

impl LoginHistory {
    pub fn new(user_id: Uuid, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            login_time: Utc::now(),
            ip_address,
            user_agent,
            last_visited_path: None,
        }
    }

    /// Paths longer than `LAST_PATH_MAX_LEN` are not stored; returns whether
    /// the path was kept
    pub fn set_last_visited_path(&mut self, path: &str) -> bool {
        if path.chars().count() > LAST_PATH_MAX_LEN {
            return false;
        }
        self.last_visited_path = Some(path.to_string());
        true
    }
}
