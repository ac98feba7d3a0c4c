//! Search parameters and row types shared by the member and leader listings

use chrono::{DateTime, Utc};
use parish_core::humanize::format_time_since;
use parish_core::models::{ChurchMember, Gender, Leader, MemberStatus};
use parish_storage::{LeaderFilter, MemberFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of a listing page. Blank and unparsable values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    /// Substring of the full name or member id
    pub name: Option<String>,
    pub gender: Option<String>,
    pub cell: Option<String>,
    pub outstation: Option<String>,
    pub occupation: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListingQuery {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender.as_str().to_string());
        self
    }

    pub fn occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn member_filter(&self, statuses: &[MemberStatus]) -> MemberFilter {
        MemberFilter {
            statuses: statuses.to_vec(),
            name: present(&self.name).map(str::to_string),
            gender: present(&self.gender).and_then(|g| g.parse().ok()),
            cell_id: present(&self.cell).and_then(|c| Uuid::parse_str(c).ok()),
            outstation_id: present(&self.outstation).and_then(|o| Uuid::parse_str(o).ok()),
        }
    }

    pub fn leader_filter(&self, statuses: &[MemberStatus]) -> LeaderFilter {
        LeaderFilter {
            member: self.member_filter(statuses),
            occupation: present(&self.occupation).and_then(|o| o.parse().ok()),
        }
    }
}

/// Head counts shown above every listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTotals {
    pub total: usize,
    pub male: usize,
    pub female: usize,
}

impl GenderTotals {
    pub fn count<'a>(genders: impl IntoIterator<Item = &'a Gender>) -> Self {
        genders
            .into_iter()
            .fold(Self::default(), |mut totals, gender| {
                totals.total += 1;
                match gender {
                    Gender::Male => totals.male += 1,
                    Gender::Female => totals.female += 1,
                }
                totals
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRow {
    #[serde(flatten)]
    pub member: ChurchMember,
    pub time_since_created: String,
}

impl MemberRow {
    pub fn new(member: ChurchMember, now: DateTime<Utc>) -> Self {
        let time_since_created = format_time_since(Some(member.date_created), now);
        Self {
            member,
            time_since_created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListing {
    pub members: Vec<MemberRow>,
    pub totals: GenderTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderRow {
    pub leader: Leader,
    pub member: ChurchMember,
    pub time_since_created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderListing {
    pub leaders: Vec<LeaderRow>,
    pub totals: GenderTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_bad_values_are_ignored() {
        let query = ListingQuery {
            name: Some("  ".into()),
            gender: Some("Unknown".into()),
            cell: Some("not-a-uuid".into()),
            ..ListingQuery::default()
        };
        let filter = query.member_filter(&[MemberStatus::Active]);
        assert_eq!(filter, MemberFilter::with_status(MemberStatus::Active));
    }

    #[test]
    fn test_leader_filter_parses_occupation() {
        let cell = Uuid::new_v4();
        let query = ListingQuery {
            cell: Some(cell.to_string()),
            ..ListingQuery::default()
        }
        .name("mushi")
        .gender(Gender::Female)
        .occupation("Choir Leader");

        let filter = query.leader_filter(&[MemberStatus::Inactive]);
        assert_eq!(filter.member.name.as_deref(), Some("mushi"));
        assert_eq!(filter.member.gender, Some(Gender::Female));
        assert_eq!(filter.member.cell_id, Some(cell));
        assert_eq!(
            filter.occupation,
            Some(parish_core::models::Occupation::ChoirLeader)
        );
    }

    #[test]
    fn test_gender_totals() {
        let genders = [Gender::Male, Gender::Female, Gender::Female];
        assert_eq!(
            GenderTotals::count(genders.iter()),
            GenderTotals {
                total: 3,
                male: 1,
                female: 2
            }
        );
    }
}
