//! Member self-service: requesting an account, resetting credentials and
//! managing the profile picture

use crate::hashing::PasswordHasher;
use crate::{AuthError, AuthResult};
use parish_core::models::{ChurchMember, Leader, User, UserType};
use parish_core::FlashMessage;
use parish_storage::{LeaderStore, MediaStorage, MemberStore, Stores, UserStore};
use parish_validation::forms::{account_request_rules, password_reset_rules};
use parish_validation::traits::text;
use parish_validation::FormData;
use serde::Serialize;
use std::sync::Arc;

pub const ADMIN_CONTACT: &str = "+255767972343";
const PROFILE_PICTURE_DIR: &str = "profile_pictures";

/// A member found by their public member id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifiedMember {
    pub member: ChurchMember,
    pub leader: Option<Leader>,
    /// Username of the existing account, when there is one
    pub username: Option<String>,
    pub greeting: String,
}

#[derive(Clone)]
pub struct AccountService {
    members: Arc<dyn MemberStore>,
    leaders: Arc<dyn LeaderStore>,
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    media: Arc<dyn MediaStorage>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("hasher", &self.hasher.hasher_name())
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        stores: &Stores,
        hasher: Arc<dyn PasswordHasher>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            members: stores.members.clone(),
            leaders: stores.leaders.clone(),
            users: stores.users.clone(),
            hasher,
            media,
        }
    }

    /// First step of the account request: who is asking?
    pub async fn identify_for_request(&self, member_id: &str) -> AuthResult<IdentifiedMember> {
        let member = self
            .find_member(
                member_id,
                format!(
                    "The system does not identify you. Please contact the admin at {}.",
                    ADMIN_CONTACT
                ),
            )
            .await?;
        let leader = self.leaders.find_leader_by_member(member.id).await?;
        let greeting = match &leader {
            Some(leader) => format!("You are a leader: {} ({}).", leader.occupation, member.full_name),
            None => format!("Well done, we identify you as {}.", member.full_name),
        };
        let username = self
            .users
            .find_user_by_member(member.id)
            .await?
            .map(|user| user.username);

        Ok(IdentifiedMember {
            member,
            leader,
            username,
            greeting,
        })
    }

    /// Second step: create a church-member account for the identified member
    pub async fn request_account(&self, form: &FormData) -> AuthResult<(User, FlashMessage)> {
        account_request_rules().check(form).await?;
        let member_id = text(form, "member_id").unwrap_or_default();
        let username = text(form, "username").unwrap_or_default().trim();
        let password = text(form, "password").unwrap_or_default();

        let identified = self.identify_for_request(member_id).await?;
        let member = identified.member;
        if identified.username.is_some() {
            return Err(AuthError::conflict(format!(
                "{} already has an account. Use forgot password to recover it.",
                member.full_name
            )));
        }
        self.ensure_username_free(username, None).await?;

        let mut user = User::new(
            username,
            member.phone_number.clone(),
            UserType::ChurchMember,
            self.hasher.hash_password(password)?,
        )
        .with_church_member(member.id);
        user.email = member.email.clone();
        user.normalize_for_save()?;

        let user = self.users.insert_user(user).await?;
        tracing::info!(user = %user.username, member_id = %member.member_id, "Account created");
        let flash = FlashMessage::success(format!(
            "Account successfully created for {}. You can now log in.",
            member.full_name
        ));
        Ok((user, flash))
    }

    /// First step of a credential reset; the member must already have an account
    pub async fn identify_for_reset(&self, member_id: &str) -> AuthResult<IdentifiedMember> {
        let member = self
            .find_member(
                member_id,
                format!(
                    "The system does not recognize this ID. Please contact admin at {}.",
                    ADMIN_CONTACT
                ),
            )
            .await?;
        let Some(user) = self.users.find_user_by_member(member.id).await? else {
            return Err(AuthError::not_found(
                "This member does not have an account. Please request an account first.",
            ));
        };
        let leader = self.leaders.find_leader_by_member(member.id).await?;
        let greeting = format!("Well done! We identified you as {}.", member.full_name);

        Ok(IdentifiedMember {
            member,
            leader,
            username: Some(user.username),
            greeting,
        })
    }

    /// Replace the username and password of the member's account
    pub async fn reset_password(&self, form: &FormData) -> AuthResult<(User, FlashMessage)> {
        password_reset_rules().check(form).await?;
        let member_id = text(form, "member_id").unwrap_or_default();
        let new_username = text(form, "new_username").unwrap_or_default().trim();
        let new_password = text(form, "new_password").unwrap_or_default();

        let identified = self.identify_for_reset(member_id).await?;
        let member = identified.member;
        let mut user = self
            .users
            .find_user_by_member(member.id)
            .await?
            .ok_or_else(|| AuthError::not_found("Account not found"))?;
        self.ensure_username_free(new_username, Some(&user)).await?;

        user.username = new_username.to_string();
        user.password_hash = self.hasher.hash_password(new_password)?;
        self.users.update_user(&user).await?;
        tracing::info!(user = %user.username, member_id = %member.member_id, "Credentials reset");

        let flash = FlashMessage::success(format!(
            "Password reset successfully for {}. You can now log in.",
            member.full_name
        ));
        Ok((user, flash))
    }

    /// Store a new profile picture, replacing any previous one
    pub async fn upload_profile_picture(
        &self,
        user: &User,
        file_name: &str,
        data: &[u8],
    ) -> AuthResult<User> {
        let file_name = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
        if file_name.is_empty() || data.is_empty() {
            return Err(AuthError::bad_request("No profile picture uploaded"));
        }

        let mut user = self.reload(user).await?;
        let stored = self
            .media
            .put(
                &format!("{}/{}_{}", PROFILE_PICTURE_DIR, user.id, file_name),
                data,
            )
            .await?;
        if let Some(previous) = user.profile_picture.replace(stored) {
            if Some(&previous) != user.profile_picture.as_ref() {
                self.media.delete(&previous).await?;
            }
        }
        self.users.update_user(&user).await?;
        Ok(user)
    }

    pub async fn remove_profile_picture(&self, user: &User) -> AuthResult<User> {
        let mut user = self.reload(user).await?;
        let Some(path) = user.profile_picture.take() else {
            return Err(AuthError::bad_request("No profile picture found"));
        };
        self.media.delete(&path).await?;
        self.users.update_user(&user).await?;
        Ok(user)
    }

    async fn find_member(&self, member_id: &str, missing: String) -> AuthResult<ChurchMember> {
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return Err(AuthError::not_found(missing));
        }
        self.members
            .find_member_by_member_id(member_id)
            .await?
            .ok_or_else(|| AuthError::not_found(missing))
    }

    async fn ensure_username_free(&self, username: &str, owner: Option<&User>) -> AuthResult<()> {
        match self.users.find_user_by_username(username).await? {
            Some(existing) if owner.map_or(true, |owner| owner.id != existing.id) => Err(
                AuthError::conflict(format!("The username {} is already taken.", username)),
            ),
            _ => Ok(()),
        }
    }

    async fn reload(&self, user: &User) -> AuthResult<User> {
        self.users
            .get_user(user.id)
            .await?
            .ok_or_else(|| AuthError::not_found("Account not found"))
    }
}
