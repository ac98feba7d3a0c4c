//! Leaders: church members holding a named occupation

use crate::errors::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const LEADER_ID_LEN: usize = 20;

/// Occupations a leader can hold. The display string is also the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupation {
    #[serde(rename = "Parish Priest")]
    ParishPriest,
    #[serde(rename = "Associate Priest")]
    AssociatePriest,
    #[serde(rename = "Deacon")]
    Deacon,
    #[serde(rename = "Lay Ministers")]
    LayMinisters,
    #[serde(rename = "Catechists")]
    Catechists,
    #[serde(rename = "Community Group Leaders")]
    CommunityGroupLeaders,
    #[serde(rename = "Parish Elders")]
    ParishElders,
    #[serde(rename = "Parish Office Staff")]
    ParishOfficeStaff,
    #[serde(rename = "Parish Council Member")]
    ParishCouncilMember,
    #[serde(rename = "Social Ministry Leader")]
    SocialMinistryLeader,
    #[serde(rename = "Parish Council Chairperson")]
    ParishCouncilChairperson,
    #[serde(rename = "Parish Council Secretary")]
    ParishCouncilSecretary,
    #[serde(rename = "Parish Treasurer")]
    ParishTreasurer,
    #[serde(rename = "Finance Committee Member")]
    FinanceCommitteeMember,
    #[serde(rename = "Development Committee Leader")]
    DevelopmentCommitteeLeader,
    #[serde(rename = "Choir Leader")]
    ChoirLeader,
    #[serde(rename = "Parish Accountant")]
    ParishAccountant,
    #[serde(rename = "Religious Education Leaders")]
    ReligiousEducationLeaders,
    #[serde(rename = "Hospitality Committee Chairperson")]
    HospitalityCommitteeChairperson,
    #[serde(rename = "Retreat and Training Committee Member")]
    RetreatAndTrainingCommitteeMember,
    #[serde(rename = "Youth Committee Members")]
    YouthCommitteeMembers,
    #[serde(rename = "Women's and Men's Committee Members")]
    WomensAndMensCommitteeMembers,
    #[serde(rename = "Senior Pastor")]
    SeniorPastor,
    #[serde(rename = "Evangelist")]
    Evangelist,
}

impl Occupation {
    pub const ALL: [Occupation; 24] = [
        Occupation::ParishPriest,
        Occupation::AssociatePriest,
        Occupation::Deacon,
        Occupation::LayMinisters,
        Occupation::Catechists,
        Occupation::CommunityGroupLeaders,
        Occupation::ParishElders,
        Occupation::ParishOfficeStaff,
        Occupation::ParishCouncilMember,
        Occupation::SocialMinistryLeader,
        Occupation::ParishCouncilChairperson,
        Occupation::ParishCouncilSecretary,
        Occupation::ParishTreasurer,
        Occupation::FinanceCommitteeMember,
        Occupation::DevelopmentCommitteeLeader,
        Occupation::ChoirLeader,
        Occupation::ParishAccountant,
        Occupation::ReligiousEducationLeaders,
        Occupation::HospitalityCommitteeChairperson,
        Occupation::RetreatAndTrainingCommitteeMember,
        Occupation::YouthCommitteeMembers,
        Occupation::WomensAndMensCommitteeMembers,
        Occupation::SeniorPastor,
        Occupation::Evangelist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Occupation::ParishPriest => "Parish Priest",
            Occupation::AssociatePriest => "Associate Priest",
            Occupation::Deacon => "Deacon",
            Occupation::LayMinisters => "Lay Ministers",
            Occupation::Catechists => "Catechists",
            Occupation::CommunityGroupLeaders => "Community Group Leaders",
            Occupation::ParishElders => "Parish Elders",
            Occupation::ParishOfficeStaff => "Parish Office Staff",
            Occupation::ParishCouncilMember => "Parish Council Member",
            Occupation::SocialMinistryLeader => "Social Ministry Leader",
            Occupation::ParishCouncilChairperson => "Parish Council Chairperson",
            Occupation::ParishCouncilSecretary => "Parish Council Secretary",
            Occupation::ParishTreasurer => "Parish Treasurer",
            Occupation::FinanceCommitteeMember => "Finance Committee Member",
            Occupation::DevelopmentCommitteeLeader => "Development Committee Leader",
            Occupation::ChoirLeader => "Choir Leader",
            Occupation::ParishAccountant => "Parish Accountant",
            Occupation::ReligiousEducationLeaders => "Religious Education Leaders",
            Occupation::HospitalityCommitteeChairperson => "Hospitality Committee Chairperson",
            Occupation::RetreatAndTrainingCommitteeMember => "Retreat and Training Committee Member",
            Occupation::YouthCommitteeMembers => "Youth Committee Members",
            Occupation::WomensAndMensCommitteeMembers => "Women's and Men's Committee Members",
            Occupation::SeniorPastor => "Senior Pastor",
            Occupation::Evangelist => "Evangelist",
        }
    }
}

impl std::fmt::Display for Occupation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Occupation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Occupation::ALL
            .iter()
            .copied()
            .find(|occupation| occupation.as_str() == s)
            .ok_or_else(|| CoreError::invalid_value("occupation", s))
    }
}

/// A church member's leadership record (one per member)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub id: Uuid,
    /// 20 characters: ten digits and ten lowercase letters, shuffled
    pub leader_id: Option<String>,
    pub church_member_id: Uuid,
    pub occupation: Occupation,
    pub start_date: NaiveDate,
    pub responsibilities: String,
    pub time_in_service: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl Leader {
    pub fn new(
        church_member_id: Uuid,
        occupation: Occupation,
        start_date: NaiveDate,
        responsibilities: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            leader_id: None,
            church_member_id,
            occupation,
            start_date,
            responsibilities: responsibilities.into(),
            time_in_service: None,
            date_created: Utc::now(),
        }
    }
}

/// Ten random digits plus ten random lowercase letters in shuffled order
pub fn generate_leader_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut chars: Vec<char> = Vec::with_capacity(LEADER_ID_LEN);
    for _ in 0..LEADER_ID_LEN / 2 {
        chars.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    for _ in 0..LEADER_ID_LEN / 2 {
        chars.push(char::from(b'a' + rng.gen_range(0..26u8)));
    }
    chars.shuffle(rng);
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_id_shape() {
        let mut rng = rand::thread_rng();
        let id = generate_leader_id(&mut rng);

        assert_eq!(id.len(), LEADER_ID_LEN);
        assert_eq!(id.chars().filter(|c| c.is_ascii_digit()).count(), 10);
        assert_eq!(id.chars().filter(|c| c.is_ascii_lowercase()).count(), 10);
    }

    #[test]
    fn test_occupation_strings() {
        assert_eq!(Occupation::ALL.len(), 24);
        assert_eq!(
            "Women's and Men's Committee Members".parse::<Occupation>().unwrap(),
            Occupation::WomensAndMensCommitteeMembers
        );
        assert_eq!(Occupation::SeniorPastor.to_string(), "Senior Pastor");
        assert!("Bishop".parse::<Occupation>().is_err());

        let json = serde_json::to_string(&Occupation::ParishTreasurer).unwrap();
        assert_eq!(json, "\"Parish Treasurer\"");
    }
}
