//! Store traits implemented by every backend

use crate::error::StoreResult;
use async_trait::async_trait;
use parish_core::models::{
    Cell, ChurchMember, ChurchYear, Gender, Leader, LoginHistory, MemberStatus, News, NewsMedia,
    Occupation, OutStation, SentSms, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filters for member listings. Empty `statuses` means any status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberFilter {
    pub statuses: Vec<MemberStatus>,
    /// Case-insensitive substring of full name or member id
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub cell_id: Option<Uuid>,
    pub outstation_id: Option<Uuid>,
}

impl MemberFilter {
    pub fn with_status(status: MemberStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Self::default()
        }
    }

    pub fn with_statuses(statuses: &[MemberStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Self::default()
        }
    }

    pub fn matches_status(&self, status: MemberStatus) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&status)
    }
}

/// Filters for leader listings; member fields apply to the linked member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderFilter {
    pub member: MemberFilter,
    pub occupation: Option<Occupation>,
}

/// A leader joined with the member record it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderWithMember {
    pub leader: Leader,
    pub member: ChurchMember,
}

/// A news item with its attached media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsWithMedia {
    pub news: News,
    pub media: Vec<NewsMedia>,
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Insert a new member; the public member id must be unused
    async fn insert_member(&self, member: ChurchMember) -> StoreResult<ChurchMember>;

    async fn update_member(&self, member: &ChurchMember) -> StoreResult<()>;

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<ChurchMember>>;

    async fn find_member_by_member_id(&self, member_id: &str) -> StoreResult<Option<ChurchMember>>;

    /// Members matching `filter`, ordered by full name
    async fn list_members(&self, filter: &MemberFilter) -> StoreResult<Vec<ChurchMember>>;

    /// Removes the member with its leader record and login account
    async fn delete_member(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait LeaderStore: Send + Sync {
    /// Insert a leader; a member can hold at most one leader record
    async fn insert_leader(&self, leader: Leader) -> StoreResult<Leader>;

    async fn update_leader(&self, leader: &Leader) -> StoreResult<()>;

    async fn get_leader(&self, id: Uuid) -> StoreResult<Option<Leader>>;

    async fn find_leader_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<Leader>>;

    async fn leader_id_exists(&self, leader_id: &str) -> StoreResult<bool>;

    /// Leaders matching `filter`, ordered by the member's full name
    async fn list_leaders(&self, filter: &LeaderFilter) -> StoreResult<Vec<LeaderWithMember>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert an account; usernames are unique
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    async fn update_user(&self, user: &User) -> StoreResult<()>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait LoginHistoryStore: Send + Sync {
    async fn record_login(&self, record: LoginHistory) -> StoreResult<LoginHistory>;

    /// Most recent login of the user
    async fn latest_login(&self, user_id: Uuid) -> StoreResult<Option<LoginHistory>>;

    /// Most recent login of the user other than `current_login_id`
    async fn previous_login(
        &self,
        user_id: Uuid,
        current_login_id: Uuid,
    ) -> StoreResult<Option<LoginHistory>>;

    async fn set_last_visited_path(&self, record_id: Uuid, path: &str) -> StoreResult<()>;

    /// Remove every login record of the user, returning how many were removed
    async fn clear_login_history(&self, user_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait SmsLogStore: Send + Sync {
    async fn record_sms(&self, sms: SentSms) -> StoreResult<SentSms>;

    /// Newest first
    async fn list_sms(&self) -> StoreResult<Vec<SentSms>>;

    async fn update_sms_status(&self, id: Uuid, status: &str) -> StoreResult<()>;

    async fn delete_sms(&self, id: Uuid) -> StoreResult<bool>;

    async fn delete_all_sms(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn insert_news(&self, news: News, media: Vec<NewsMedia>) -> StoreResult<NewsWithMedia>;

    /// Update the article; `Some(media)` replaces every attached file
    async fn update_news(&self, news: &News, media: Option<Vec<NewsMedia>>) -> StoreResult<()>;

    async fn get_news(&self, id: Uuid) -> StoreResult<Option<NewsWithMedia>>;

    /// Newest first
    async fn list_news(&self) -> StoreResult<Vec<NewsWithMedia>>;

    /// Remove a news item together with its media records
    async fn delete_news(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrganisationStore: Send + Sync {
    async fn insert_outstation(&self, outstation: OutStation) -> StoreResult<OutStation>;

    async fn insert_cell(&self, cell: Cell) -> StoreResult<Cell>;

    async fn list_outstations(&self) -> StoreResult<Vec<OutStation>>;

    async fn list_cells(&self) -> StoreResult<Vec<Cell>>;

    async fn list_years(&self) -> StoreResult<Vec<ChurchYear>>;

    /// Insert or update by year
    async fn save_year(&self, year: &ChurchYear) -> StoreResult<()>;
}
