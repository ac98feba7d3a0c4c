//! Leader records: promotion from members, listings and the distribution
//! across cells and outstations

use crate::forms::leader_from_form;
use crate::listing::{GenderTotals, LeaderListing, LeaderRow, ListingQuery};
use crate::members::MEMBER_NOT_FOUND;
use crate::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use parish_core::humanize::{age_label, format_time_since, local_today, since_created, time_in_service};
use parish_core::models::{generate_leader_id, Cell, ChurchMember, Leader, MemberStatus, OutStation};
use parish_core::FlashMessage;
use parish_storage::{LeaderFilter, LeaderStore, LeaderWithMember, MemberStore, OrganisationStore, Stores};
use parish_validation::forms::leader_rules;
use parish_validation::FormData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const LEADER_NOT_FOUND: &str = "Leader not found.";
pub const ALREADY_A_LEADER: &str = "This church member already has leader details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderScope {
    /// Leaders whose member record is active
    Active,
    Inactive,
}

impl LeaderScope {
    fn status(&self) -> MemberStatus {
        match self {
            LeaderScope::Active => MemberStatus::Active,
            LeaderScope::Inactive => MemberStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderProfile {
    pub leader: Leader,
    pub member: ChurchMember,
    pub age: String,
    pub since_created: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

/// Leaders per cell and per outstation, most first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadersDistribution {
    pub by_cell: Vec<NamedCount>,
    pub by_outstation: Vec<NamedCount>,
    pub largest_cell: String,
    pub smallest_cell: String,
    pub largest_outstation: String,
    pub smallest_outstation: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadersHome {
    pub active: usize,
    pub inactive: usize,
    pub distribution: LeadersDistribution,
}

#[derive(Clone)]
pub struct LeaderRegistry {
    members: Arc<dyn MemberStore>,
    leaders: Arc<dyn LeaderStore>,
    organisation: Arc<dyn OrganisationStore>,
}

impl std::fmt::Debug for LeaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderRegistry").finish_non_exhaustive()
    }
}

impl LeaderRegistry {
    pub fn new(stores: &Stores) -> Self {
        Self {
            members: stores.members.clone(),
            leaders: stores.leaders.clone(),
            organisation: stores.organisation.clone(),
        }
    }

    /// Record leader details for a member who has none yet
    pub async fn create_leader_from_member(
        &self,
        church_member_id: Uuid,
        form: &FormData,
    ) -> RegistryResult<(Leader, FlashMessage)> {
        let member = self
            .members
            .get_member(church_member_id)
            .await?
            .ok_or_else(|| RegistryError::not_found(MEMBER_NOT_FOUND))?;
        if self.leaders.find_leader_by_member(member.id).await?.is_some() {
            return Err(RegistryError::conflict(ALREADY_A_LEADER));
        }

        leader_rules().check(form).await?;
        let mut leader = leader_from_form(member.id, form)?;
        leader.leader_id = Some(self.unique_leader_id().await?);
        leader.time_in_service = Some(time_in_service(
            Some(leader.start_date),
            local_today(Utc::now()),
        ));

        let leader = self.leaders.insert_leader(leader).await?;
        info!(
            member_id = %member.member_id,
            occupation = %leader.occupation,
            "Leader details saved"
        );
        let flash = FlashMessage::success(format!(
            "Leader details for {} saved successfully!",
            member.full_name
        ));
        Ok((leader, flash))
    }

    async fn unique_leader_id(&self) -> RegistryResult<String> {
        loop {
            // ThreadRng must not live across the await below
            let candidate = generate_leader_id(&mut rand::thread_rng());
            if !self.leaders.leader_id_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!("Leader id collision, generating another");
        }
    }

    /// Recompute `time_in_service` and persist it when it changed
    async fn refresh_service_time(&self, leader: &mut Leader, now: DateTime<Utc>) -> RegistryResult<()> {
        let current = time_in_service(Some(leader.start_date), local_today(now));
        if leader.time_in_service.as_deref() != Some(current.as_str()) {
            leader.time_in_service = Some(current);
            self.leaders.update_leader(leader).await?;
        }
        Ok(())
    }

    pub async fn list(&self, scope: LeaderScope, query: &ListingQuery) -> RegistryResult<LeaderListing> {
        let found = self
            .leaders
            .list_leaders(&query.leader_filter(&[scope.status()]))
            .await?;
        let now = Utc::now();

        let mut rows = Vec::with_capacity(found.len());
        for LeaderWithMember { mut leader, member } in found {
            self.refresh_service_time(&mut leader, now).await?;
            rows.push(LeaderRow {
                time_since_created: format_time_since(Some(leader.date_created), now),
                leader,
                member,
            });
        }

        let totals = GenderTotals::count(rows.iter().map(|row| &row.member.gender));
        Ok(LeaderListing {
            leaders: rows,
            totals,
        })
    }

    pub async fn profile(&self, id: Uuid) -> RegistryResult<LeaderProfile> {
        let mut leader = self
            .leaders
            .get_leader(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(LEADER_NOT_FOUND))?;
        let member = self
            .members
            .get_member(leader.church_member_id)
            .await?
            .ok_or_else(|| RegistryError::not_found(MEMBER_NOT_FOUND))?;

        let now = Utc::now();
        self.refresh_service_time(&mut leader, now).await?;
        Ok(LeaderProfile {
            age: age_label(member.date_of_birth, local_today(now)),
            since_created: since_created(leader.date_created, now),
            leader,
            member,
        })
    }

    pub async fn home(&self) -> RegistryResult<LeadersHome> {
        let leaders = self.leaders.list_leaders(&LeaderFilter::default()).await?;
        let count = |status: MemberStatus| leaders.iter().filter(|l| l.member.status == status).count();
        let (active, inactive) = (count(MemberStatus::Active), count(MemberStatus::Inactive));

        let cells = self.organisation.list_cells().await?;
        let outstations = self.organisation.list_outstations().await?;
        Ok(LeadersHome {
            active,
            inactive,
            distribution: distribution(&leaders, &cells, &outstations),
        })
    }

    pub async fn distribution(&self) -> RegistryResult<LeadersDistribution> {
        let leaders = self.leaders.list_leaders(&LeaderFilter::default()).await?;
        let cells = self.organisation.list_cells().await?;
        let outstations = self.organisation.list_outstations().await?;
        Ok(distribution(&leaders, &cells, &outstations))
    }
}

/// Counts sorted by count descending, then name. Unnamed groups are dropped.
fn ranked(counts: HashMap<String, usize>) -> Vec<NamedCount> {
    let mut ranked: Vec<NamedCount> = counts
        .into_iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, count)| NamedCount { name, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

fn first_and_last(ranked: &[NamedCount]) -> (String, String) {
    match (ranked.first(), ranked.last()) {
        (Some(first), Some(last)) => (first.name.clone(), last.name.clone()),
        _ => ("N/A".to_string(), "N/A".to_string()),
    }
}

pub fn distribution(
    leaders: &[LeaderWithMember],
    cells: &[Cell],
    outstations: &[OutStation],
) -> LeadersDistribution {
    let cells: HashMap<Uuid, &Cell> = cells.iter().map(|c| (c.id, c)).collect();
    let outstations: HashMap<Uuid, &str> = outstations.iter().map(|o| (o.id, o.name.as_str())).collect();

    let mut by_cell: HashMap<String, usize> = HashMap::new();
    let mut by_outstation: HashMap<String, usize> = HashMap::new();
    for entry in leaders {
        let Some(cell) = entry.member.cell_id.and_then(|id| cells.get(&id)) else {
            continue;
        };
        *by_cell.entry(cell.name.clone()).or_default() += 1;
        if let Some(outstation) = cell.outstation_id.and_then(|id| outstations.get(&id)) {
            *by_outstation.entry(outstation.to_string()).or_default() += 1;
        }
    }

    let by_cell = ranked(by_cell);
    let by_outstation = ranked(by_outstation);
    let (largest_cell, smallest_cell) = first_and_last(&by_cell);
    let (largest_outstation, smallest_outstation) = first_and_last(&by_outstation);

    let analysis = format!(
        "The church has leaders distributed across **various cells and outstations**. \
         The highest number of leaders is observed in **{}**, while **{}** has the fewest leaders. \
         Similarly, the outstation with the most leaders is **{}**, while **{}** has the least leaders.",
        largest_cell, smallest_cell, largest_outstation, smallest_outstation
    );

    LeadersDistribution {
        by_cell,
        by_outstation,
        largest_cell,
        smallest_cell,
        largest_outstation,
        smallest_outstation,
        analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use parish_core::models::{Gender, Occupation};
    use serde_json::json;

    fn form(pairs: &[(&str, serde_json::Value)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn leader_form(occupation: &str) -> FormData {
        form(&[
            ("occupation", json!(occupation)),
            ("start_date", json!("2019-04-01")),
            ("responsibilities", json!("Weekly fellowship")),
        ])
    }

    async fn member(stores: &Stores, name: &str, gender: Gender, status: MemberStatus) -> ChurchMember {
        stores
            .members
            .insert_member(ChurchMember::new(name, gender, "+255754000111").with_status(status))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_leader_from_member() {
        let stores = Stores::in_memory();
        let registry = LeaderRegistry::new(&stores);
        let amani = member(&stores, "Amani Mollel", Gender::Male, MemberStatus::Active).await;

        let (leader, flash) = registry
            .create_leader_from_member(amani.id, &leader_form("Evangelist"))
            .await
            .unwrap();
        assert_eq!(flash.text, "Leader details for Amani Mollel saved successfully!");
        assert_eq!(leader.occupation, Occupation::Evangelist);
        assert_eq!(leader.leader_id.as_ref().map(String::len), Some(20));
        assert!(leader.time_in_service.is_some());

        let err = registry
            .create_leader_from_member(amani.id, &leader_form("Deacon"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), ALREADY_A_LEADER);

        let err = registry
            .create_leader_from_member(Uuid::new_v4(), &leader_form("Deacon"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MEMBER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_leader_fields() {
        let stores = Stores::in_memory();
        let registry = LeaderRegistry::new(&stores);
        let amani = member(&stores, "Amani Mollel", Gender::Male, MemberStatus::Active).await;

        let err = registry
            .create_leader_from_member(amani.id, &form(&[("occupation", json!("Deacon"))]))
            .await
            .unwrap_err();
        let RegistryError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.has_field_errors("start_date"));
        assert!(errors.has_field_errors("responsibilities"));
    }

    #[tokio::test]
    async fn test_listing_refreshes_time_in_service() {
        let stores = Stores::in_memory();
        let registry = LeaderRegistry::new(&stores);
        let amani = member(&stores, "Amani Mollel", Gender::Male, MemberStatus::Active).await;
        let neema = member(&stores, "Neema Mushi", Gender::Female, MemberStatus::Inactive).await;

        let stale = Leader::new(
            amani.id,
            Occupation::ChoirLeader,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            "Choir",
        );
        let stale_id = stale.id;
        stores.leaders.insert_leader(stale).await.unwrap();
        stores
            .leaders
            .insert_leader(Leader::new(
                neema.id,
                Occupation::Deacon,
                NaiveDate::from_ymd_opt(2018, 6, 1).unwrap(),
                "Visits",
            ))
            .await
            .unwrap();

        let listing = registry
            .list(LeaderScope::Active, &ListingQuery::default())
            .await
            .unwrap();
        assert_eq!(listing.leaders.len(), 1);
        assert_eq!(listing.totals.male, 1);
        let stored = stores.leaders.get_leader(stale_id).await.unwrap().unwrap();
        assert_eq!(stored.time_in_service, listing.leaders[0].leader.time_in_service);
        assert!(stored.time_in_service.unwrap().ends_with("days"));

        let by_occupation = registry
            .list(LeaderScope::Inactive, &ListingQuery::default().occupation("Choir Leader"))
            .await
            .unwrap();
        assert!(by_occupation.leaders.is_empty());

        let home = registry.home().await.unwrap();
        assert_eq!((home.active, home.inactive), (1, 1));
    }

    #[test]
    fn test_distribution_ranks_cells_and_outstations() {
        let north = OutStation::new("Kihesa");
        let south = OutStation::new("Ipogolo");
        let cells = vec![
            Cell::new("Amani", Some(north.id)),
            Cell::new("Baraka", Some(north.id)),
            Cell::new("Upendo", Some(south.id)),
        ];

        let mut leaders = Vec::new();
        for cell_index in [0, 0, 1, 2, 2, 2] {
            let member = ChurchMember::new("Leader", Gender::Male, "+255754000111")
                .with_cell(cells[cell_index].id);
            let leader = Leader::new(
                member.id,
                Occupation::Deacon,
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                "",
            );
            leaders.push(LeaderWithMember { leader, member });
        }
        let unassigned = ChurchMember::new("Nobody", Gender::Female, "+255754000111");
        leaders.push(LeaderWithMember {
            leader: Leader::new(unassigned.id, Occupation::Deacon, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), ""),
            member: unassigned,
        });

        let result = distribution(&leaders, &cells, &[north, south]);
        assert_eq!(
            result.by_cell,
            vec![
                NamedCount { name: "Upendo".into(), count: 3 },
                NamedCount { name: "Amani".into(), count: 2 },
                NamedCount { name: "Baraka".into(), count: 1 },
            ]
        );
        assert_eq!(result.largest_cell, "Upendo");
        assert_eq!(result.smallest_cell, "Baraka");
        // Kihesa 3, Ipogolo 3: ties fall back to name order
        assert_eq!(result.largest_outstation, "Ipogolo");
        assert_eq!(result.smallest_outstation, "Kihesa");
        assert!(result
            .analysis
            .contains("The highest number of leaders is observed in **Upendo**"));
    }

    #[test]
    fn test_empty_distribution() {
        let result = distribution(&[], &[], &[]);
        assert_eq!(result.largest_cell, "N/A");
        assert_eq!(result.smallest_outstation, "N/A");
        assert!(result.by_cell.is_empty());
    }
}
