//! In-memory store used by tests and local development

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    LeaderFilter, LeaderStore, LeaderWithMember, LoginHistoryStore, MemberFilter, MemberStore,
    NewsStore, NewsWithMedia, OrganisationStore, SmsLogStore, UserStore,
};
use async_trait::async_trait;
use parish_core::models::{
    Cell, ChurchMember, ChurchYear, Leader, LoginHistory, News, NewsMedia, OutStation, SentSms,
    User,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    members: HashMap<Uuid, ChurchMember>,
    leaders: HashMap<Uuid, Leader>,
    users: HashMap<Uuid, User>,
    logins: Vec<LoginHistory>,
    sms: Vec<SentSms>,
    news: HashMap<Uuid, News>,
    news_media: Vec<NewsMedia>,
    outstations: Vec<OutStation>,
    cells: Vec<Cell>,
    years: Vec<ChurchYear>,
}

impl State {
    fn outstation_of(&self, cell_id: Option<Uuid>) -> Option<Uuid> {
        let cell_id = cell_id?;
        self.cells
            .iter()
            .find(|cell| cell.id == cell_id)
            .and_then(|cell| cell.outstation_id)
    }

    fn member_matches(&self, member: &ChurchMember, filter: &MemberFilter) -> bool {
        if !filter.matches_status(member.status) {
            return false;
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            if !member.matches_name(name) {
                return false;
            }
        }
        if filter.gender.is_some_and(|gender| gender != member.gender) {
            return false;
        }
        if filter.cell_id.is_some() && filter.cell_id != member.cell_id {
            return false;
        }
        if filter.outstation_id.is_some() && filter.outstation_id != self.outstation_of(member.cell_id)
        {
            return false;
        }
        true
    }

    fn news_with_media(&self, news: &News) -> NewsWithMedia {
        NewsWithMedia {
            news: news.clone(),
            media: self
                .news_media
                .iter()
                .filter(|m| m.news_id == news.id)
                .cloned()
                .collect(),
        }
    }
}

/// Process-local store implementing every store trait
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn insert_member(&self, member: ChurchMember) -> StoreResult<ChurchMember> {
        let mut state = self.state.write().await;
        if state
            .members
            .values()
            .any(|existing| existing.member_id == member.member_id)
        {
            return Err(StoreError::conflict(format!(
                "member id {} already exists",
                member.member_id
            )));
        }
        state.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn update_member(&self, member: &ChurchMember) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.members.get_mut(&member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("church member")),
        }
    }

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<ChurchMember>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }

    async fn find_member_by_member_id(&self, member_id: &str) -> StoreResult<Option<ChurchMember>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .values()
            .find(|member| member.member_id == member_id)
            .cloned())
    }

    async fn list_members(&self, filter: &MemberFilter) -> StoreResult<Vec<ChurchMember>> {
        let state = self.state.read().await;
        let mut members: Vec<ChurchMember> = state
            .members
            .values()
            .filter(|member| state.member_matches(member, filter))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(members)
    }

    async fn delete_member(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.members.remove(&id).is_some();
        if removed {
            state.leaders.retain(|_, leader| leader.church_member_id != id);
            let accounts: Vec<Uuid> = state
                .users
                .values()
                .filter(|user| user.church_member_id == Some(id))
                .map(|user| user.id)
                .collect();
            state.users.retain(|_, user| user.church_member_id != Some(id));
            state.logins.retain(|record| !accounts.contains(&record.user_id));
        }
        Ok(removed)
    }
}

#[async_trait]
impl LeaderStore for MemoryStore {
    async fn insert_leader(&self, leader: Leader) -> StoreResult<Leader> {
        let mut state = self.state.write().await;
        if state
            .leaders
            .values()
            .any(|existing| existing.church_member_id == leader.church_member_id)
        {
            return Err(StoreError::conflict(
                "This church member already has leader details.",
            ));
        }
        state.leaders.insert(leader.id, leader.clone());
        Ok(leader)
    }

    async fn update_leader(&self, leader: &Leader) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.leaders.get_mut(&leader.id) {
            Some(existing) => {
                *existing = leader.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("leader")),
        }
    }

    async fn get_leader(&self, id: Uuid) -> StoreResult<Option<Leader>> {
        Ok(self.state.read().await.leaders.get(&id).cloned())
    }

    async fn find_leader_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<Leader>> {
        let state = self.state.read().await;
        Ok(state
            .leaders
            .values()
            .find(|leader| leader.church_member_id == church_member_id)
            .cloned())
    }

    async fn leader_id_exists(&self, leader_id: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .leaders
            .values()
            .any(|leader| leader.leader_id.as_deref() == Some(leader_id)))
    }

    async fn list_leaders(&self, filter: &LeaderFilter) -> StoreResult<Vec<LeaderWithMember>> {
        let state = self.state.read().await;
        let mut leaders: Vec<LeaderWithMember> = state
            .leaders
            .values()
            .filter(|leader| filter.occupation.map_or(true, |o| o == leader.occupation))
            .filter_map(|leader| {
                let member = state.members.get(&leader.church_member_id)?;
                state
                    .member_matches(member, &filter.member)
                    .then(|| LeaderWithMember {
                        leader: leader.clone(),
                        member: member.clone(),
                    })
            })
            .collect();
        leaders.sort_by(|a, b| a.member.full_name.cmp(&b.member.full_name));
        Ok(leaders)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(StoreError::conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.username == user.username)
        {
            return Err(StoreError::conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("user")),
        }
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_user_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.church_member_id == Some(church_member_id))
            .cloned())
    }
}

#[async_trait]
impl LoginHistoryStore for MemoryStore {
    async fn record_login(&self, record: LoginHistory) -> StoreResult<LoginHistory> {
        self.state.write().await.logins.push(record.clone());
        Ok(record)
    }

    async fn latest_login(&self, user_id: Uuid) -> StoreResult<Option<LoginHistory>> {
        let state = self.state.read().await;
        Ok(state
            .logins
            .iter()
            .filter(|record| record.user_id == user_id)
            .max_by_key(|record| record.login_time)
            .cloned())
    }

    async fn previous_login(
        &self,
        user_id: Uuid,
        current_login_id: Uuid,
    ) -> StoreResult<Option<LoginHistory>> {
        let state = self.state.read().await;
        Ok(state
            .logins
            .iter()
            .filter(|record| record.user_id == user_id && record.id != current_login_id)
            .max_by_key(|record| record.login_time)
            .cloned())
    }

    async fn set_last_visited_path(&self, record_id: Uuid, path: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.logins.iter_mut().find(|record| record.id == record_id) {
            Some(record) => {
                record.set_last_visited_path(path);
                Ok(())
            }
            None => Err(StoreError::not_found("login history")),
        }
    }

    async fn clear_login_history(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.logins.len();
        state.logins.retain(|record| record.user_id != user_id);
        Ok((before - state.logins.len()) as u64)
    }
}

#[async_trait]
impl SmsLogStore for MemoryStore {
    async fn record_sms(&self, sms: SentSms) -> StoreResult<SentSms> {
        self.state.write().await.sms.push(sms.clone());
        Ok(sms)
    }

    async fn list_sms(&self) -> StoreResult<Vec<SentSms>> {
        let mut sms = self.state.read().await.sms.clone();
        sms.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(sms)
    }

    async fn update_sms_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.sms.iter_mut().find(|sms| sms.id == id) {
            Some(sms) => {
                sms.status = status.to_string();
                Ok(())
            }
            None => Err(StoreError::not_found("sent sms")),
        }
    }

    async fn delete_sms(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.sms.len();
        state.sms.retain(|sms| sms.id != id);
        Ok(state.sms.len() != before)
    }

    async fn delete_all_sms(&self) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let count = state.sms.len() as u64;
        state.sms.clear();
        Ok(count)
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn insert_news(&self, news: News, media: Vec<NewsMedia>) -> StoreResult<NewsWithMedia> {
        let mut state = self.state.write().await;
        state.news.insert(news.id, news.clone());
        state.news_media.extend(media.iter().cloned());
        Ok(NewsWithMedia { news, media })
    }

    async fn update_news(&self, news: &News, media: Option<Vec<NewsMedia>>) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.news.get_mut(&news.id) {
            Some(existing) => *existing = news.clone(),
            None => return Err(StoreError::not_found("news")),
        }
        if let Some(media) = media {
            state.news_media.retain(|m| m.news_id != news.id);
            state.news_media.extend(media);
        }
        Ok(())
    }

    async fn get_news(&self, id: Uuid) -> StoreResult<Option<NewsWithMedia>> {
        let state = self.state.read().await;
        Ok(state.news.get(&id).map(|news| state.news_with_media(news)))
    }

    async fn list_news(&self) -> StoreResult<Vec<NewsWithMedia>> {
        let state = self.state.read().await;
        let mut items: Vec<NewsWithMedia> = state
            .news
            .values()
            .map(|news| state.news_with_media(news))
            .collect();
        items.sort_by(|a, b| b.news.created_at.cmp(&a.news.created_at));
        Ok(items)
    }

    async fn delete_news(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        state.news_media.retain(|m| m.news_id != id);
        Ok(state.news.remove(&id).is_some())
    }
}

#[async_trait]
impl OrganisationStore for MemoryStore {
    async fn insert_outstation(&self, outstation: OutStation) -> StoreResult<OutStation> {
        self.state.write().await.outstations.push(outstation.clone());
        Ok(outstation)
    }

    async fn insert_cell(&self, cell: Cell) -> StoreResult<Cell> {
        self.state.write().await.cells.push(cell.clone());
        Ok(cell)
    }

    async fn list_outstations(&self) -> StoreResult<Vec<OutStation>> {
        let mut outstations = self.state.read().await.outstations.clone();
        outstations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(outstations)
    }

    async fn list_cells(&self) -> StoreResult<Vec<Cell>> {
        let mut cells = self.state.read().await.cells.clone();
        cells.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cells)
    }

    async fn list_years(&self) -> StoreResult<Vec<ChurchYear>> {
        let mut years = self.state.read().await.years.clone();
        years.sort_by_key(|y| y.year);
        Ok(years)
    }

    async fn save_year(&self, year: &ChurchYear) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.years.iter_mut().find(|y| y.year == year.year) {
            Some(existing) => existing.is_current = year.is_current,
            None => state.years.push(year.clone()),
        }
        Ok(())
    }
}
