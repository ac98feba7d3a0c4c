//! Role gates for church-member views
//!
//! A leader-only view admits a user only when every link in the chain holds:
//! the account is a church-member account, its member record is active, the
//! member holds a leader record, and that leader's occupation is the one the
//! view serves. The first broken link decides the denial message, so the
//! checks always run in that order.

use crate::{AuthError, AuthResult};
use parish_core::models::{ChurchMember, Leader, Occupation, User, UserType};
use parish_storage::{LeaderStore, MemberStore};
use std::sync::Arc;

/// The records a gated view works with once access is granted
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderContext {
    pub user: User,
    pub member: ChurchMember,
    pub leader: Leader,
}

/// Admits active leaders holding one occupation
#[derive(Clone)]
pub struct OccupationGate {
    occupation: Occupation,
    denial: String,
    members: Arc<dyn MemberStore>,
    leaders: Arc<dyn LeaderStore>,
}

impl std::fmt::Debug for OccupationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccupationGate")
            .field("occupation", &self.occupation)
            .field("denial", &self.denial)
            .finish()
    }
}

impl OccupationGate {
    pub fn new(
        occupation: Occupation,
        members: Arc<dyn MemberStore>,
        leaders: Arc<dyn LeaderStore>,
    ) -> Self {
        Self {
            occupation,
            denial: format!("Only {}s can access this view.", occupation),
            members,
            leaders,
        }
    }

    /// Replace the message used when the occupation does not match
    pub fn with_denial_message(mut self, message: impl Into<String>) -> Self {
        self.denial = message.into();
        self
    }

    pub fn occupation(&self) -> Occupation {
        self.occupation
    }

    pub async fn check(&self, user: &User) -> AuthResult<LeaderContext> {
        let result = self.resolve(user).await;
        if let Err(AuthError::AccessDenied { message }) = &result {
            tracing::warn!(
                user = %user.username,
                occupation = %self.occupation,
                "Access denied: {}",
                message
            );
        }
        result
    }

    async fn resolve(&self, user: &User) -> AuthResult<LeaderContext> {
        if user.user_type != UserType::ChurchMember {
            return Err(AuthError::access_denied("user type must be CHURCH_MEMBER."));
        }

        let member = match user.church_member_id {
            Some(id) => self.members.get_member(id).await?,
            None => None,
        };
        let member = match member {
            Some(member) if member.is_active() => member,
            _ => return Err(AuthError::access_denied("ChurchMember must be active.")),
        };

        let Some(leader) = self.leaders.find_leader_by_member(member.id).await? else {
            return Err(AuthError::access_denied("ChurchMember is not a Leader."));
        };

        if leader.occupation != self.occupation {
            return Err(AuthError::access_denied(self.denial.clone()));
        }

        Ok(LeaderContext {
            user: user.clone(),
            member,
            leader,
        })
    }
}

/// Superusers and `ADMIN` accounts
pub fn require_admin(user: &User) -> AuthResult<()> {
    if user.is_admin_or_superuser() {
        Ok(())
    } else {
        Err(AuthError::access_denied("administrator access required."))
    }
}

/// Church-member accounts linked to a member record
pub fn require_church_member(user: &User) -> AuthResult<()> {
    if user.user_type == UserType::ChurchMember && user.church_member_id.is_some() {
        Ok(())
    } else {
        Err(AuthError::access_denied("user type must be CHURCH_MEMBER."))
    }
}
