//! Church member registration, approval and listings

use crate::forms::{apply_member_form, member_from_form};
use crate::listing::{GenderTotals, ListingQuery, MemberListing, MemberRow};
use crate::{RegistryError, RegistryResult};
use chrono::Utc;
use parish_core::humanize::{age_label, local_today, since_created};
use parish_core::models::{generate_member_id, ChurchMember, Leader, MemberDocument, MemberStatus};
use parish_core::FlashMessage;
use parish_sms::{SmsNotifier, SmsOutcome};
use parish_storage::{
    LeaderStore, MediaStorage, MemberFilter, MemberStore, OrganisationStore, StoreError, Stores,
};
use parish_validation::forms::member_rules;
use parish_validation::FormData;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const MEMBER_NOT_FOUND: &str = "Church member not found.";

/// Fresh member ids tried before giving up on a colliding insert
const MEMBER_ID_ATTEMPTS: usize = 5;

/// Where the office goes after saving a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "id", rename_all = "snake_case")]
pub enum NextStep {
    /// Capture leader details for the new member
    CreateLeader(Uuid),
    MemberList,
    MemberDetail(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSaved {
    pub member: ChurchMember,
    pub messages: Vec<FlashMessage>,
    pub next: NextStep,
    /// Set when a notification was attempted
    pub sms: Option<SmsOutcome>,
}

/// Which members a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberScope {
    /// Office register: pending members first, then active ones
    Register,
    Active,
    Inactive,
}

impl MemberScope {
    fn statuses(&self) -> &'static [MemberStatus] {
        match self {
            MemberScope::Register => &[MemberStatus::Pending, MemberStatus::Active],
            MemberScope::Active => &[MemberStatus::Active],
            MemberScope::Inactive => &[MemberStatus::Inactive],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersHome {
    pub active: usize,
    pub inactive: usize,
}

/// A member with the values shown on the detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProfile {
    pub member: ChurchMember,
    pub leader: Option<Leader>,
    /// `Cell (Outstation)`, or `----` when unassigned
    pub cell: String,
    pub age: String,
    pub since_created: String,
}

#[derive(Clone)]
pub struct MemberRegistry {
    members: Arc<dyn MemberStore>,
    leaders: Arc<dyn LeaderStore>,
    organisation: Arc<dyn OrganisationStore>,
    media: Arc<dyn MediaStorage>,
    notifier: SmsNotifier,
}

impl std::fmt::Debug for MemberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberRegistry")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl MemberRegistry {
    pub fn new(stores: &Stores, notifier: SmsNotifier, media: Arc<dyn MediaStorage>) -> Self {
        Self {
            members: stores.members.clone(),
            leaders: stores.leaders.clone(),
            organisation: stores.organisation.clone(),
            media,
            notifier,
        }
    }

    /// Register a new `Pending` member and send the welcome text.
    ///
    /// The text is best effort: a gateway failure adds a warning message but
    /// the member stays saved.
    pub async fn register_member(&self, form: &FormData) -> RegistryResult<MemberSaved> {
        member_rules().check(form).await?;
        let member = self.insert_with_unique_id(member_from_form(form)?).await?;
        info!(member_id = %member.member_id, "Church member registered");

        let sms = self.notifier.welcome(&member).await;
        let mut messages = Vec::new();
        match &sms {
            SmsOutcome::Sent { .. } => messages.push(FlashMessage::success(
                "Church member saved successfully & SMS notification sent!",
            )),
            SmsOutcome::Failed { error } => {
                messages.push(FlashMessage::success("Church member saved successfully!"));
                messages.push(FlashMessage::warning(format!(
                    "SMS notification could not be sent: {}",
                    error
                )));
            }
        }

        let next = if member.is_this_church_member_a_leader {
            NextStep::CreateLeader(member.id)
        } else {
            NextStep::MemberList
        };

        Ok(MemberSaved {
            member,
            messages,
            next,
            sms: Some(sms),
        })
    }

    async fn insert_with_unique_id(&self, mut member: ChurchMember) -> RegistryResult<ChurchMember> {
        for _ in 1..MEMBER_ID_ATTEMPTS {
            match self.members.insert_member(member.clone()).await {
                Ok(saved) => return Ok(saved),
                Err(StoreError::Conflict { message }) => {
                    warn!("Member id {} already used: {}", member.member_id, message);
                    member.member_id = generate_member_id();
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(self.members.insert_member(member).await?)
    }

    pub async fn update_member(&self, id: Uuid, form: &FormData) -> RegistryResult<MemberSaved> {
        let mut member = self.get(id).await?;
        member_rules().check(form).await?;
        apply_member_form(&mut member, form)?;
        self.members.update_member(&member).await?;

        Ok(MemberSaved {
            member,
            messages: vec![FlashMessage::success("Church member updated successfully!")],
            next: NextStep::MemberDetail(id),
            sms: None,
        })
    }

    /// Move a `Pending` member to `Active` and send the approval text
    pub async fn approve_member(&self, id: Uuid) -> RegistryResult<MemberSaved> {
        let mut member = self.get(id).await?;
        if member.status != MemberStatus::Pending {
            return Err(RegistryError::invalid_state(format!(
                "{} is not pending approval.",
                member.full_name
            )));
        }

        member.status = MemberStatus::Active;
        self.members.update_member(&member).await?;
        info!(member_id = %member.member_id, "Church member approved");

        let sms = self.notifier.approval(&member).await;
        let mut messages = vec![FlashMessage::success(format!(
            "{} has been approved and notified via SMS!",
            member.full_name
        ))];
        if let SmsOutcome::Failed { error } = &sms {
            messages.push(FlashMessage::warning(format!(
                "SMS notification could not be sent: {}",
                error
            )));
        }

        Ok(MemberSaved {
            member,
            messages,
            next: NextStep::MemberList,
            sms: Some(sms),
        })
    }

    pub async fn delete_member(&self, id: Uuid) -> RegistryResult<FlashMessage> {
        let member = self.get(id).await?;
        if !self.members.delete_member(id).await? {
            return Err(RegistryError::not_found(MEMBER_NOT_FOUND));
        }
        info!(member_id = %member.member_id, "Church member deleted");
        Ok(FlashMessage::success(format!(
            "Church member '{}' deleted successfully!",
            member.full_name
        )))
    }

    /// Store a passport or certificate scan, replacing the previous file
    pub async fn upload_document(
        &self,
        id: Uuid,
        document: MemberDocument,
        file_name: &str,
        data: &[u8],
    ) -> RegistryResult<(ChurchMember, FlashMessage)> {
        let file_name = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
        if file_name.is_empty() || data.is_empty() {
            return Err(RegistryError::field(
                document.field_name(),
                format!(
                    "Failed to upload {}. Please try again.",
                    document.label().to_lowercase()
                ),
            ));
        }

        let mut member = self.get(id).await?;
        let stored = self
            .media
            .put(
                &format!("{}/{}_{}", document.directory(), member.member_id, file_name),
                data,
            )
            .await?;
        let slot = member.document_mut(document);
        if let Some(previous) = slot.replace(stored.clone()) {
            if previous != stored {
                self.media.delete(&previous).await?;
            }
        }
        self.members.update_member(&member).await?;
        info!(member_id = %member.member_id, document = document.field_name(), "Member document stored");

        let flash = FlashMessage::success(format!("{} uploaded successfully!", document.label()));
        Ok((member, flash))
    }

    pub async fn get(&self, id: Uuid) -> RegistryResult<ChurchMember> {
        self.members
            .get_member(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(MEMBER_NOT_FOUND))
    }

    pub async fn profile(&self, id: Uuid) -> RegistryResult<MemberProfile> {
        let member = self.get(id).await?;
        let leader = self.leaders.find_leader_by_member(id).await?;
        let cell = self.cell_label(member.cell_id).await?;
        let now = Utc::now();

        Ok(MemberProfile {
            age: age_label(member.date_of_birth, local_today(now)),
            since_created: since_created(member.date_created, now),
            member,
            leader,
            cell,
        })
    }

    async fn cell_label(&self, cell_id: Option<Uuid>) -> RegistryResult<String> {
        let Some(cell_id) = cell_id else {
            return Ok("----".to_string());
        };
        let cells = self.organisation.list_cells().await?;
        let Some(cell) = cells.into_iter().find(|c| c.id == cell_id) else {
            return Ok("----".to_string());
        };
        let outstation = match cell.outstation_id {
            Some(outstation_id) => self
                .organisation
                .list_outstations()
                .await?
                .into_iter()
                .find(|o| o.id == outstation_id)
                .map(|o| o.name),
            None => None,
        };
        Ok(match outstation {
            Some(outstation) => format!("{} ({})", cell.name, outstation),
            None => cell.name,
        })
    }

    /// Filtered listing sorted by name; the register puts pending members first
    pub async fn list(&self, scope: MemberScope, query: &ListingQuery) -> RegistryResult<MemberListing> {
        let mut members = self
            .members
            .list_members(&query.member_filter(scope.statuses()))
            .await?;
        if scope == MemberScope::Register {
            // stable, so name order holds within each status
            members.sort_by_key(|m| m.status != MemberStatus::Pending);
        }

        let totals = GenderTotals::count(members.iter().map(|m| &m.gender));
        let now = Utc::now();
        Ok(MemberListing {
            members: members.into_iter().map(|m| MemberRow::new(m, now)).collect(),
            totals,
        })
    }

    pub async fn home(&self) -> RegistryResult<MembersHome> {
        let members = self.members.list_members(&MemberFilter::default()).await?;
        Ok(MembersHome {
            active: members.iter().filter(|m| m.status == MemberStatus::Active).count(),
            inactive: members.iter().filter(|m| m.status == MemberStatus::Inactive).count(),
        })
    }

    pub(crate) fn members(&self) -> &Arc<dyn MemberStore> {
        &self.members
    }

    pub(crate) fn organisation(&self) -> &Arc<dyn OrganisationStore> {
        &self.organisation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parish_core::models::{Cell, Gender, LoginHistory, OutStation, User, UserType};
    use parish_sms::MockSmsProvider;
    use parish_storage::LocalMediaStorage;
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        stores: Stores,
        provider: MockSmsProvider,
        registry: MemberRegistry,
        media: Arc<LocalMediaStorage>,
        _media_root: TempDir,
    }

    fn fixture() -> Fixture {
        let stores = Stores::in_memory();
        let provider = MockSmsProvider::new();
        let notifier = SmsNotifier::new(
            Arc::new(provider.clone()),
            stores.sms.clone(),
            "KKKT-MKWAWA",
            "https://parish.example.org/accounts/request-account/",
        );
        let media_root = TempDir::new().unwrap();
        let media = Arc::new(LocalMediaStorage::new(media_root.path()));
        let registry = MemberRegistry::new(&stores, notifier, media.clone());
        Fixture {
            stores,
            provider,
            registry,
            media,
            _media_root: media_root,
        }
    }

    fn form(pairs: &[(&str, serde_json::Value)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn registration(name: &str, leader: bool) -> FormData {
        form(&[
            ("full_name", json!(name)),
            ("gender", json!("Female")),
            ("phone_number", json!("+255754000111")),
            ("is_baptised", json!("on")),
            ("is_this_church_member_a_leader", json!(leader)),
        ])
    }

    #[tokio::test]
    async fn test_register_sends_welcome_and_picks_next_step() {
        let f = fixture();

        let saved = f
            .registry
            .register_member(&registration("Rehema Kweka", false))
            .await
            .unwrap();
        assert_eq!(saved.member.status, MemberStatus::Pending);
        assert_eq!(saved.next, NextStep::MemberList);
        assert_eq!(
            saved.messages,
            vec![FlashMessage::success(
                "Church member saved successfully & SMS notification sent!"
            )]
        );

        let sent = f.provider.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "255754000111");
        assert!(sent[0].text.contains(&saved.member.member_id));

        let leader = f
            .registry
            .register_member(&registration("Amani Mollel", true))
            .await
            .unwrap();
        assert_eq!(leader.next, NextStep::CreateLeader(leader.member.id));
    }

    #[tokio::test]
    async fn test_sacrament_errors_block_registration() {
        let f = fixture();
        let data = form(&[
            ("full_name", json!("Rehema Kweka")),
            ("gender", json!("Female")),
            ("phone_number", json!("+255754000111")),
            ("is_confirmed", json!("on")),
        ]);

        let err = f.registry.register_member(&data).await.unwrap_err();
        let RegistryError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors.messages(),
            vec!["A member cannot be confirmed without First Communion and Baptism.".to_string()]
        );
        assert!(f.provider.sent().await.is_empty());
        assert!(f
            .stores
            .members
            .list_members(&MemberFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_the_member() {
        let f = fixture();
        f.provider.fail_with("Beem API did not return request_id").await;

        let saved = f
            .registry
            .register_member(&registration("Rehema Kweka", false))
            .await
            .unwrap();
        assert!(!saved.sms.as_ref().unwrap().is_sent());
        assert_eq!(saved.messages.len(), 2);
        assert!(f.registry.get(saved.member.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_approve_only_pending() {
        let f = fixture();
        let saved = f
            .registry
            .register_member(&registration("Rehema Kweka", false))
            .await
            .unwrap();

        let approved = f.registry.approve_member(saved.member.id).await.unwrap();
        assert_eq!(approved.member.status, MemberStatus::Active);
        assert_eq!(
            approved.messages[0].text,
            "Rehema Kweka has been approved and notified via SMS!"
        );
        assert!(f.provider.sent().await[1].text.starts_with("Congratulations"));

        let err = f.registry.approve_member(saved.member.id).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));

        let err = f.registry.approve_member(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), MEMBER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let f = fixture();
        let saved = f
            .registry
            .register_member(&registration("Rehema Kweka", false))
            .await
            .unwrap();

        let mut data = registration("Rehema J. Kweka", false);
        data.insert("status".into(), json!("Inactive"));
        let updated = f.registry.update_member(saved.member.id, &data).await.unwrap();
        assert_eq!(updated.member.full_name, "Rehema J. Kweka");
        assert_eq!(updated.member.status, MemberStatus::Inactive);
        assert_eq!(updated.next, NextStep::MemberDetail(saved.member.id));

        let flash = f.registry.delete_member(saved.member.id).await.unwrap();
        assert_eq!(flash.text, "Church member 'Rehema J. Kweka' deleted successfully!");
        assert!(f.registry.delete_member(saved.member.id).await.is_err());
    }

    #[tokio::test]
    async fn test_upload_document_replaces_previous_file() {
        let f = fixture();
        let saved = f
            .registry
            .register_member(&registration("Zawadi Lyimo", false))
            .await
            .unwrap();
        let id = saved.member.id;

        let (member, flash) = f
            .registry
            .upload_document(id, MemberDocument::Passport, "picha.jpg", b"first")
            .await
            .unwrap();
        assert_eq!(flash.text, "Passport uploaded successfully!");
        let first = member.passport.clone().unwrap();
        assert!(first.starts_with("passports/"));

        let (member, _) = f
            .registry
            .upload_document(id, MemberDocument::Passport, "mpya.png", b"second")
            .await
            .unwrap();
        let second = member.passport.clone().unwrap();
        assert!(!f.media.exists(&first).await.unwrap());
        assert_eq!(f.media.get(&second).await.unwrap(), Some(b"second".to_vec()));

        let (_, flash) = f
            .registry
            .upload_document(id, MemberDocument::BaptismCertificate, "ubatizo.pdf", b"cert")
            .await
            .unwrap();
        assert_eq!(flash.text, "Baptism certificate uploaded successfully!");
        let stored = f.registry.get(id).await.unwrap();
        assert_eq!(stored.passport, Some(second));
        assert!(stored
            .baptism_certificate
            .is_some_and(|path| path.starts_with("certificates/baptism/")));
    }

    #[tokio::test]
    async fn test_upload_document_needs_content() {
        let f = fixture();
        let saved = f
            .registry
            .register_member(&registration("Zawadi Lyimo", false))
            .await
            .unwrap();

        let err = f
            .registry
            .upload_document(saved.member.id, MemberDocument::Passport, "picha.jpg", b"")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let missing = f
            .registry
            .upload_document(Uuid::new_v4(), MemberDocument::Passport, "picha.jpg", b"x")
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), MEMBER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_login_account() {
        let f = fixture();
        let member = ChurchMember::new("Neema Mushi", Gender::Female, "+255754000333")
            .with_status(MemberStatus::Active);
        let member = f.stores.members.insert_member(member).await.unwrap();
        let account = User::new("neema", "+255754000333", UserType::ChurchMember, "hash")
            .with_church_member(member.id);
        let account = f.stores.users.insert_user(account).await.unwrap();
        f.stores
            .logins
            .record_login(LoginHistory::new(account.id, None, None))
            .await
            .unwrap();

        f.registry.delete_member(member.id).await.unwrap();

        assert!(f.stores.users.get_user(account.id).await.unwrap().is_none());
        assert!(f.stores.users.find_user_by_username("neema").await.unwrap().is_none());
        assert!(f.stores.logins.latest_login(account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_listing_puts_pending_first() {
        let f = fixture();
        let members = f.stores.members.clone();
        for (name, gender, status) in [
            ("Amani Mollel", Gender::Male, MemberStatus::Active),
            ("Baraka Swai", Gender::Male, MemberStatus::Pending),
            ("Catherine Lema", Gender::Female, MemberStatus::Active),
            ("Doto Massawe", Gender::Male, MemberStatus::Inactive),
        ] {
            members
                .insert_member(ChurchMember::new(name, gender, "+255754000111").with_status(status))
                .await
                .unwrap();
        }

        let listing = f
            .registry
            .list(MemberScope::Register, &ListingQuery::default())
            .await
            .unwrap();
        let names: Vec<_> = listing.members.iter().map(|r| r.member.full_name.as_str()).collect();
        assert_eq!(names, vec!["Baraka Swai", "Amani Mollel", "Catherine Lema"]);
        assert_eq!(listing.totals.male, 2);
        assert_eq!(listing.members[0].time_since_created, "Just now");

        let inactive = f
            .registry
            .list(MemberScope::Inactive, &ListingQuery::default())
            .await
            .unwrap();
        assert_eq!(inactive.totals.total, 1);

        let home = f.registry.home().await.unwrap();
        assert_eq!(home, MembersHome { active: 2, inactive: 1 });
    }

    #[tokio::test]
    async fn test_profile_labels_cell_with_outstation() {
        let f = fixture();
        let outstation = f
            .stores
            .organisation
            .insert_outstation(OutStation::new("Ipogolo"))
            .await
            .unwrap();
        let cell = f
            .stores
            .organisation
            .insert_cell(Cell::new("Mshikamano", Some(outstation.id)))
            .await
            .unwrap();
        let member = f
            .stores
            .members
            .insert_member(ChurchMember::new("Amani Mollel", Gender::Male, "+255754000111").with_cell(cell.id))
            .await
            .unwrap();

        let profile = f.registry.profile(member.id).await.unwrap();
        assert_eq!(profile.cell, "Mshikamano (Ipogolo)");
        assert_eq!(profile.age, "----");
        assert!(profile.leader.is_none());
    }
}
