//! Membership statistics for the office report

use crate::members::MemberRegistry;
use crate::RegistryResult;
use parish_core::models::{Cell, ChurchMember, Gender, MaritalStatus, MemberStatus, OutStation};
use parish_storage::MemberFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const REPORT_COMMENTS: &str = "These statistics provide insights into membership trends, gender distribution, and sacramental participation across outstations and cells. Cells with lower membership may indicate areas needing outreach or support. Sacramental and marital data can guide pastoral planning and highlight opportunities for spiritual growth.";

/// Sacramental and marital counts over active members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SacramentStats {
    pub baptized: usize,
    pub unbaptized: usize,
    /// Members with a confirmation date on record
    pub confirmed: usize,
    pub unconfirmed: usize,
    pub married_males: usize,
    pub unmarried_males: usize,
    pub married_females: usize,
    pub unmarried_females: usize,
}

impl SacramentStats {
    fn add(&mut self, member: &ChurchMember) {
        if member.status != MemberStatus::Active {
            return;
        }
        if member.is_baptised {
            self.baptized += 1;
        } else {
            self.unbaptized += 1;
        }
        if member.date_confirmed.is_some() {
            self.confirmed += 1;
        } else {
            self.unconfirmed += 1;
        }
        // members without a marital status count in neither column
        let married = match member.marital_status {
            Some(MaritalStatus::Married) => true,
            Some(_) => false,
            None => return,
        };
        match (member.gender, married) {
            (Gender::Male, true) => self.married_males += 1,
            (Gender::Male, false) => self.unmarried_males += 1,
            (Gender::Female, true) => self.married_females += 1,
            (Gender::Female, false) => self.unmarried_females += 1,
        }
    }
}

/// Active and inactive head counts split by gender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub active_male: usize,
    pub active_female: usize,
    pub inactive_male: usize,
    pub inactive_female: usize,
}

impl StatusCounts {
    fn add(&mut self, member: &ChurchMember) {
        self.total += 1;
        match (member.status, member.gender) {
            (MemberStatus::Active, Gender::Male) => {
                self.active += 1;
                self.active_male += 1;
            }
            (MemberStatus::Active, Gender::Female) => {
                self.active += 1;
                self.active_female += 1;
            }
            (MemberStatus::Inactive, Gender::Male) => {
                self.inactive += 1;
                self.inactive_male += 1;
            }
            (MemberStatus::Inactive, Gender::Female) => {
                self.inactive += 1;
                self.inactive_female += 1;
            }
            (MemberStatus::Pending, _) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStats {
    /// `Cell (Outstation)`
    pub cell: String,
    pub members: StatusCounts,
    pub sacraments: SacramentStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersReport {
    pub members: StatusCounts,
    pub total_outstations: usize,
    pub total_cells: usize,
    pub cells: Vec<CellStats>,
    pub largest_cell: Option<String>,
    pub smallest_cell: Option<String>,
    pub sacraments: SacramentStats,
    pub comments: String,
}

pub fn members_report(members: &[ChurchMember], cells: &[Cell], outstations: &[OutStation]) -> MembersReport {
    let outstation_names: HashMap<_, _> = outstations.iter().map(|o| (o.id, o.name.as_str())).collect();

    let mut overall = StatusCounts::default();
    let mut sacraments = SacramentStats::default();
    let mut per_cell: HashMap<_, (StatusCounts, SacramentStats)> = HashMap::new();
    for member in members {
        overall.add(member);
        sacraments.add(member);
        if let Some(cell_id) = member.cell_id {
            let (counts, stats) = per_cell.entry(cell_id).or_default();
            counts.add(member);
            stats.add(member);
        }
    }

    let cell_stats: Vec<CellStats> = cells
        .iter()
        .map(|cell| {
            let (members, sacraments) = per_cell.get(&cell.id).copied().unwrap_or_default();
            let cell_name = match cell.outstation_id.and_then(|id| outstation_names.get(&id)) {
                Some(outstation) => format!("{} ({})", cell.name, outstation),
                None => cell.name.clone(),
            };
            CellStats {
                cell: cell_name,
                members,
                sacraments,
            }
        })
        .collect();

    // first maximum and first minimum in cell order
    let largest_cell = cell_stats
        .iter()
        .reduce(|best, c| if c.members.total > best.members.total { c } else { best })
        .map(|c| c.cell.clone());
    let smallest_cell = cell_stats
        .iter()
        .reduce(|best, c| if c.members.total < best.members.total { c } else { best })
        .map(|c| c.cell.clone());

    MembersReport {
        members: overall,
        total_outstations: outstations.len(),
        total_cells: cells.len(),
        cells: cell_stats,
        largest_cell,
        smallest_cell,
        sacraments,
        comments: REPORT_COMMENTS.to_string(),
    }
}

impl MemberRegistry {
    pub async fn report(&self) -> RegistryResult<MembersReport> {
        let members = self.members().list_members(&MemberFilter::default()).await?;
        let cells = self.organisation().list_cells().await?;
        let outstations = self.organisation().list_outstations().await?;
        Ok(members_report(&members, &cells, &outstations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn member(gender: Gender, status: MemberStatus, cell: &Cell) -> ChurchMember {
        ChurchMember::new("Member", gender, "+255754000111")
            .with_status(status)
            .with_cell(cell.id)
    }

    #[test]
    fn test_members_report() {
        let outstation = OutStation::new("Kihesa");
        let amani = Cell::new("Amani", Some(outstation.id));
        let upendo = Cell::new("Upendo", Some(outstation.id));
        let empty = Cell::new("Tumaini", None);

        let mut married = member(Gender::Male, MemberStatus::Active, &amani);
        married.is_baptised = true;
        married.date_confirmed = NaiveDate::from_ymd_opt(2010, 5, 2);
        married.marital_status = Some(MaritalStatus::Married);
        let mut widowed = member(Gender::Female, MemberStatus::Active, &amani);
        widowed.marital_status = Some(MaritalStatus::Widowed);

        let members = vec![
            married,
            widowed,
            member(Gender::Female, MemberStatus::Inactive, &amani),
            member(Gender::Male, MemberStatus::Pending, &upendo),
            ChurchMember::new("No cell", Gender::Female, "+255754000111").with_status(MemberStatus::Active),
        ];

        let report = members_report(&members, &[amani, upendo, empty], &[outstation]);
        assert_eq!(report.members.total, 5);
        assert_eq!(report.members.active, 3);
        assert_eq!(report.members.inactive_female, 1);
        assert_eq!(report.total_cells, 3);
        assert_eq!(report.total_outstations, 1);

        assert_eq!(report.cells[0].cell, "Amani (Kihesa)");
        assert_eq!(report.cells[0].members.total, 3);
        assert_eq!(report.cells[0].sacraments.baptized, 1);
        assert_eq!(report.cells[0].sacraments.confirmed, 1);
        assert_eq!(report.cells[2].cell, "Tumaini");
        assert_eq!(report.largest_cell.as_deref(), Some("Amani (Kihesa)"));
        assert_eq!(report.smallest_cell.as_deref(), Some("Tumaini"));

        assert_eq!(report.sacraments.baptized, 1);
        assert_eq!(report.sacraments.unbaptized, 2);
        assert_eq!(report.sacraments.married_males, 1);
        assert_eq!(report.sacraments.unmarried_females, 1);
        assert_eq!(report.sacraments.married_females, 0);
        assert_eq!(report.comments, REPORT_COMMENTS);
    }

    #[test]
    fn test_report_without_cells() {
        let report = members_report(&[], &[], &[]);
        assert!(report.largest_cell.is_none());
        assert_eq!(report.members, StatusCounts::default());
    }
}
