//! Church member records

use crate::errors::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

const MEMBER_ID_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MEMBER_ID_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(CoreError::invalid_value("gender", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(MaritalStatus::Single),
            "Married" => Ok(MaritalStatus::Married),
            "Divorced" => Ok(MaritalStatus::Divorced),
            "Widowed" => Ok(MaritalStatus::Widowed),
            other => Err(CoreError::invalid_value("marital_status", other)),
        }
    }
}

/// Membership status. Only `Active` members may sign in or hold gated roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Pending,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Pending => "Pending",
            MemberStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(MemberStatus::Active),
            "Pending" => Ok(MemberStatus::Pending),
            "Inactive" => Ok(MemberStatus::Inactive),
            other => Err(CoreError::invalid_value("status", other)),
        }
    }
}

/// A person recorded in the parish register, optionally linked to a login account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchMember {
    pub id: Uuid,
    /// Public identifier members quote when requesting an account
    pub member_id: String,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: MemberStatus,
    pub cell_id: Option<Uuid>,

    pub is_baptised: bool,
    pub date_of_baptism: Option<NaiveDate>,
    pub has_received_first_communion: bool,
    pub date_of_communion: Option<NaiveDate>,
    pub is_confirmed: bool,
    pub date_confirmed: Option<NaiveDate>,
    pub is_married: bool,
    pub date_of_marriage: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub spouse_name: Option<String>,
    pub number_of_children: Option<u32>,

    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,

    pub is_this_church_member_a_leader: bool,

    pub passport: Option<String>,
    pub baptism_certificate: Option<String>,
    pub confirmation_certificate: Option<String>,
    pub marriage_certificate: Option<String>,

    pub date_created: DateTime<Utc>,
}

/// Scanned files kept on a member record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberDocument {
    #[default]
    Passport,
    BaptismCertificate,
    ConfirmationCertificate,
    MarriageCertificate,
}

impl MemberDocument {
    pub fn label(&self) -> &'static str {
        match self {
            MemberDocument::Passport => "Passport",
            MemberDocument::BaptismCertificate => "Baptism certificate",
            MemberDocument::ConfirmationCertificate => "Confirmation certificate",
            MemberDocument::MarriageCertificate => "Marriage certificate",
        }
    }

    /// Directory under the media root
    pub fn directory(&self) -> &'static str {
        match self {
            MemberDocument::Passport => "passports",
            MemberDocument::BaptismCertificate => "certificates/baptism",
            MemberDocument::ConfirmationCertificate => "certificates/confirmation",
            MemberDocument::MarriageCertificate => "certificates/marriage",
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            MemberDocument::Passport => "passport",
            MemberDocument::BaptismCertificate => "baptism_certificate",
            MemberDocument::ConfirmationCertificate => "confirmation_certificate",
            MemberDocument::MarriageCertificate => "marriage_certificate",
        }
    }
}

/// The sacrament flags of a member, checked as a unit before saving
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SacramentRecord {
    pub is_baptised: bool,
    pub has_received_first_communion: bool,
    pub is_confirmed: bool,
    pub is_married: bool,
    pub marital_status: Option<MaritalStatus>,
}

impl ChurchMember {
    /// New `Pending` member with a freshly generated member id
    pub fn new(full_name: impl Into<String>, gender: Gender, phone_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: generate_member_id(),
            full_name: full_name.into(),
            gender,
            date_of_birth: None,
            phone_number: phone_number.into(),
            email: None,
            address: None,
            status: MemberStatus::Pending,
            cell_id: None,
            is_baptised: false,
            date_of_baptism: None,
            has_received_first_communion: false,
            date_of_communion: None,
            is_confirmed: false,
            date_confirmed: None,
            is_married: false,
            date_of_marriage: None,
            marital_status: None,
            spouse_name: None,
            number_of_children: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            is_this_church_member_a_leader: false,
            passport: None,
            baptism_certificate: None,
            confirmation_certificate: None,
            marriage_certificate: None,
            date_created: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: MemberStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_cell(mut self, cell_id: Uuid) -> Self {
        self.cell_id = Some(cell_id);
        self
    }

    pub fn with_sacraments(mut self, record: SacramentRecord) -> Self {
        self.is_baptised = record.is_baptised;
        self.has_received_first_communion = record.has_received_first_communion;
        self.is_confirmed = record.is_confirmed;
        self.is_married = record.is_married;
        self.marital_status = record.marital_status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn sacraments(&self) -> SacramentRecord {
        SacramentRecord {
            is_baptised: self.is_baptised,
            has_received_first_communion: self.has_received_first_communion,
            is_confirmed: self.is_confirmed,
            is_married: self.is_married,
            marital_status: self.marital_status,
        }
    }

    /// Stored path slot for `document`
    pub fn document_mut(&mut self, document: MemberDocument) -> &mut Option<String> {
        match document {
            MemberDocument::Passport => &mut self.passport,
            MemberDocument::BaptismCertificate => &mut self.baptism_certificate,
            MemberDocument::ConfirmationCertificate => &mut self.confirmation_certificate,
            MemberDocument::MarriageCertificate => &mut self.marriage_certificate,
        }
    }

    /// Case-insensitive match on full name or member id
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.full_name.to_lowercase().contains(&query)
            || self.member_id.to_lowercase().contains(&query)
    }
}

/// Generate a random public member id
pub fn generate_member_id() -> String {
    let mut rng = thread_rng();
    (0..MEMBER_ID_LEN)
        .map(|_| MEMBER_ID_CHARSET[rng.gen_range(0..MEMBER_ID_CHARSET.len())] as char)
        .collect()
}
