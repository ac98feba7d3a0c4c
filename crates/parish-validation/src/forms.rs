//! Rule sets for the forms the parish office and members submit

use crate::error::{ValidationError, ValidationResult};
use crate::rules::Rules;
use crate::traits::{text, FormData, ValidateRequest};
use crate::validators::{MinLengthValidator, PatternValidator, RequiredValidator, SacramentValidator};
use async_trait::async_trait;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Two fields must carry the same value
#[derive(Debug, Clone)]
pub struct FieldsMatch {
    pub field: &'static str,
    pub confirmation: &'static str,
    pub message: &'static str,
}

#[async_trait]
impl ValidateRequest for FieldsMatch {
    async fn validate_request(&self, data: &FormData) -> ValidationResult<()> {
        let first = text(data, self.field);
        let second = text(data, self.confirmation);
        if first.is_some() && first != second {
            return Err(
                ValidationError::with_code(self.confirmation, self.message, "mismatch").into(),
            );
        }
        Ok(())
    }
}

/// Church member registration and update form
pub fn member_rules() -> Rules {
    Rules::new()
        .field("full_name", RequiredValidator::new())
        .field("gender", RequiredValidator::new())
        .field("phone_number", RequiredValidator::new())
        .field("phone_number", PatternValidator::phone())
        .field("emergency_contact_phone", PatternValidator::phone())
        .request(SacramentValidator::new())
}

/// Self-service account request (second step, after the member id is known)
pub fn account_request_rules() -> Rules {
    Rules::new()
        .field("member_id", RequiredValidator::new())
        .field("username", RequiredValidator::new())
        .field("password", RequiredValidator::new())
        .field("password", MinLengthValidator::new(MIN_PASSWORD_LEN))
        .request(FieldsMatch {
            field: "password",
            confirmation: "confirm_password",
            message: "Passwords do not match.",
        })
}

/// Credential reset for members who already have an account
pub fn password_reset_rules() -> Rules {
    Rules::new()
        .field("member_id", RequiredValidator::new())
        .field("new_username", RequiredValidator::new())
        .field("new_password", RequiredValidator::new())
        .field("new_password", MinLengthValidator::new(MIN_PASSWORD_LEN))
        .request(FieldsMatch {
            field: "new_password",
            confirmation: "confirm_password",
            message: "Passwords do not match.",
        })
}

/// Leader details captured when promoting a member
pub fn leader_rules() -> Rules {
    Rules::new()
        .field("occupation", RequiredValidator::new())
        .field("start_date", RequiredValidator::new())
        .field("responsibilities", RequiredValidator::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::sacrament::MARRIAGE_REQUIRES_ALL_SACRAMENTS;
    use serde_json::json;

    fn form(pairs: &[(&str, serde_json::Value)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_member_form_collects_field_and_sacrament_errors() {
        let data = form(&[
            ("full_name", json!("Juma Ally")),
            ("gender", json!("Male")),
            ("phone_number", json!("0712345678")),
            ("is_married", json!(true)),
        ]);

        let errors = member_rules().check(&data).await.unwrap_err();
        let messages = errors.messages();
        assert_eq!(messages[0], MARRIAGE_REQUIRES_ALL_SACRAMENTS);
        assert!(errors.has_field_errors("phone_number"));
    }

    #[tokio::test]
    async fn test_valid_member_form() {
        let data = form(&[
            ("full_name", json!("Juma Ally")),
            ("gender", json!("Male")),
            ("phone_number", json!("+255712345678")),
            ("is_baptised", json!(true)),
        ]);
        assert!(member_rules().check(&data).await.is_ok());
    }

    #[tokio::test]
    async fn test_account_request_password_confirmation() {
        let data = form(&[
            ("member_id", json!("ABC123")),
            ("username", json!("juma")),
            ("password", json!("s3cretpass")),
            ("confirm_password", json!("different")),
        ]);
        let errors = account_request_rules().check(&data).await.unwrap_err();
        assert!(errors.has_field_errors("confirm_password"));

        let data = form(&[
            ("member_id", json!("ABC123")),
            ("username", json!("juma")),
            ("password", json!("s3cretpass")),
            ("confirm_password", json!("s3cretpass")),
        ]);
        assert!(account_request_rules().check(&data).await.is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_short_password() {
        let data = form(&[
            ("member_id", json!("ABC123")),
            ("new_username", json!("juma2")),
            ("new_password", json!("short")),
            ("confirm_password", json!("short")),
        ]);
        let errors = password_reset_rules().check(&data).await.unwrap_err();
        assert!(errors.has_field_errors("new_password"));
    }
}
