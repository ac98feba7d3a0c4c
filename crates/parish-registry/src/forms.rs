//! Turning submitted forms into member and leader records

use crate::{RegistryError, RegistryResult};
use chrono::NaiveDate;
use parish_core::models::{ChurchMember, Gender, Leader, MaritalStatus, Occupation};
use parish_validation::traits::{flag, text};
use parish_validation::{FormData, SacramentValidator, ValidationError, ValidationErrors};
use std::str::FromStr;
use uuid::Uuid;

/// Dates arrive as `YYYY-MM-DD`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Collects parse failures so every bad field is reported at once
#[derive(Default)]
struct FieldParser {
    errors: ValidationErrors,
}

impl FieldParser {
    fn parse<T: FromStr>(&mut self, form: &FormData, field: &str) -> Option<T> {
        let raw = text(form, field)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalid(field, format!("'{}' is not a valid choice.", raw));
                None
            }
        }
    }

    fn date(&mut self, form: &FormData, field: &str) -> Option<NaiveDate> {
        let raw = text(form, field)?;
        match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                self.invalid(field, "Enter a valid date.");
                None
            }
        }
    }

    fn uuid(&mut self, form: &FormData, field: &str) -> Option<Uuid> {
        let raw = text(form, field)?;
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.invalid(field, "Select a valid choice.");
                None
            }
        }
    }

    fn invalid(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .add(ValidationError::with_code(field, message, "invalid"));
    }

    fn finish(self) -> RegistryResult<()> {
        Ok(self.errors.into_result()?)
    }
}

fn optional_text(form: &FormData, field: &str) -> Option<String> {
    text(form, field).map(str::to_string)
}

/// Build a new `Pending` member. Run `member_rules` on the form first.
pub fn member_from_form(form: &FormData) -> RegistryResult<ChurchMember> {
    let full_name = text(form, "full_name").unwrap_or_default();
    let phone = text(form, "phone_number").unwrap_or_default();
    let gender: Gender = text(form, "gender").unwrap_or_default().parse()?;

    let mut member = ChurchMember::new(full_name, gender, phone);
    apply_member_form(&mut member, form)?;
    Ok(member)
}

/// Overwrite the editable fields of `member` with the submitted values.
///
/// Unchecked sacrament boxes clear the flag; blank optional fields clear the
/// stored value. `status` is only changed when submitted.
pub fn apply_member_form(member: &mut ChurchMember, form: &FormData) -> RegistryResult<()> {
    let mut parser = FieldParser::default();

    if let Some(full_name) = text(form, "full_name") {
        member.full_name = full_name.to_string();
    }
    if let Some(phone) = text(form, "phone_number") {
        member.phone_number = phone.to_string();
    }
    if let Some(gender) = parser.parse(form, "gender") {
        member.gender = gender;
    }
    if let Some(status) = parser.parse(form, "status") {
        member.status = status;
    }

    member.date_of_birth = parser.date(form, "date_of_birth");
    member.email = optional_text(form, "email");
    member.address = optional_text(form, "address");
    member.cell_id = parser.uuid(form, "cell");

    let sacraments = SacramentValidator::record_from_form(form);
    member.is_baptised = sacraments.is_baptised;
    member.has_received_first_communion = sacraments.has_received_first_communion;
    member.is_confirmed = sacraments.is_confirmed;
    member.is_married = sacraments.is_married;
    member.marital_status = sacraments.marital_status;
    member.date_of_baptism = parser.date(form, "date_of_baptism");
    member.date_of_communion = parser.date(form, "date_of_communion");
    member.date_confirmed = parser.date(form, "date_confirmed");
    member.date_of_marriage = parser.date(form, "date_of_marriage");
    if member.marital_status.is_none() {
        // the sacrament record drops values it cannot parse
        parser.parse::<MaritalStatus>(form, "marital_status");
    }
    member.spouse_name = optional_text(form, "spouse_name");
    member.number_of_children = parser.parse(form, "number_of_children");

    member.emergency_contact_name = optional_text(form, "emergency_contact_name");
    member.emergency_contact_phone = optional_text(form, "emergency_contact_phone");
    member.is_this_church_member_a_leader = flag(form, "is_this_church_member_a_leader");

    parser.finish()
}

/// Leader details for `church_member_id`. Run `leader_rules` on the form first.
pub fn leader_from_form(church_member_id: Uuid, form: &FormData) -> RegistryResult<Leader> {
    let mut parser = FieldParser::default();
    let occupation: Option<Occupation> = parser.parse(form, "occupation");
    let start_date = parser.date(form, "start_date");
    let responsibilities = text(form, "responsibilities").unwrap_or_default();
    parser.finish()?;

    match (occupation, start_date) {
        (Some(occupation), Some(start_date)) => Ok(Leader::new(
            church_member_id,
            occupation,
            start_date,
            responsibilities,
        )),
        (None, _) => Err(RegistryError::field("occupation", "This field is required.")),
        (_, None) => Err(RegistryError::field("start_date", "This field is required.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parish_core::models::MemberStatus;
    use serde_json::json;

    fn form(pairs: &[(&str, serde_json::Value)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_member_from_form() {
        let cell = Uuid::new_v4();
        let data = form(&[
            ("full_name", json!("Rehema Kweka")),
            ("gender", json!("Female")),
            ("phone_number", json!("+255754000111")),
            ("date_of_birth", json!("1994-02-17")),
            ("cell", json!(cell.to_string())),
            ("is_baptised", json!("on")),
            ("has_received_first_communion", json!("on")),
            ("marital_status", json!("Single")),
            ("number_of_children", json!("2")),
            ("is_this_church_member_a_leader", json!(true)),
        ]);

        let member = member_from_form(&data).unwrap();
        assert_eq!(member.full_name, "Rehema Kweka");
        assert_eq!(member.gender, Gender::Female);
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.date_of_birth, NaiveDate::from_ymd_opt(1994, 2, 17));
        assert_eq!(member.cell_id, Some(cell));
        assert!(member.is_baptised && member.has_received_first_communion);
        assert!(!member.is_confirmed);
        assert_eq!(member.marital_status, Some(MaritalStatus::Single));
        assert_eq!(member.number_of_children, Some(2));
        assert!(member.is_this_church_member_a_leader);
    }

    #[test]
    fn test_bad_values_are_reported_per_field() {
        let data = form(&[
            ("full_name", json!("Rehema Kweka")),
            ("gender", json!("Female")),
            ("phone_number", json!("+255754000111")),
            ("date_of_birth", json!("17/02/1994")),
            ("cell", json!("not-a-cell")),
            ("marital_status", json!("Engaged")),
        ]);

        let err = member_from_form(&data).unwrap_err();
        let RegistryError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.has_field_errors("date_of_birth"));
        assert!(errors.has_field_errors("cell"));
        assert!(errors.has_field_errors("marital_status"));
    }

    #[test]
    fn test_update_keeps_status_unless_submitted() {
        let mut member = ChurchMember::new("Rehema Kweka", Gender::Female, "+255754000111")
            .with_status(MemberStatus::Active);
        let data = form(&[("full_name", json!("Rehema J. Kweka"))]);

        apply_member_form(&mut member, &data).unwrap();
        assert_eq!(member.full_name, "Rehema J. Kweka");
        assert_eq!(member.status, MemberStatus::Active);

        let data = form(&[("status", json!("Inactive"))]);
        apply_member_form(&mut member, &data).unwrap();
        assert_eq!(member.status, MemberStatus::Inactive);
    }

    #[test]
    fn test_leader_from_form() {
        let member_id = Uuid::new_v4();
        let data = form(&[
            ("occupation", json!("Choir Leader")),
            ("start_date", json!("2020-01-05")),
            ("responsibilities", json!("Sunday choir")),
        ]);

        let leader = leader_from_form(member_id, &data).unwrap();
        assert_eq!(leader.church_member_id, member_id);
        assert_eq!(leader.occupation, Occupation::ChoirLeader);
        assert!(leader.leader_id.is_none());

        let data = form(&[
            ("occupation", json!("Bishop")),
            ("start_date", json!("2020-01-05")),
        ]);
        let RegistryError::Validation(errors) = leader_from_form(member_id, &data).unwrap_err() else {
            panic!("expected validation errors");
        };
        assert!(errors.has_field_errors("occupation"));
    }
}
