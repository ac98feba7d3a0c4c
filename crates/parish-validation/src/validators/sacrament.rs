//! Sacrament ordering: baptism, then first communion, then confirmation, then marriage

use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::traits::{flag, text, FormData, ValidateRequest};
use async_trait::async_trait;
use parish_core::models::{MaritalStatus, SacramentRecord};

pub const COMMUNION_REQUIRES_BAPTISM: &str =
    "A member cannot receive First Communion without being baptized.";
pub const CONFIRMATION_REQUIRES_COMMUNION_AND_BAPTISM: &str =
    "A member cannot be confirmed without First Communion and Baptism.";
pub const MARRIAGE_REQUIRES_ALL_SACRAMENTS: &str =
    "A member cannot be married without being confirmed, receiving First Communion, and being baptized.";
pub const MARITAL_STATUS_REQUIRES_MARRIAGE: &str =
    "Marital Status cannot be 'Married' if the member is not marked as married.";

/// Checks the four ordering rules independently and reports every violation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SacramentValidator;

impl SacramentValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, record: &SacramentRecord) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();

        if record.has_received_first_communion && !record.is_baptised {
            errors.add(ValidationError::non_field(
                COMMUNION_REQUIRES_BAPTISM,
                "communion_requires_baptism",
            ));
        }

        if record.is_confirmed && !(record.has_received_first_communion && record.is_baptised) {
            errors.add(ValidationError::non_field(
                CONFIRMATION_REQUIRES_COMMUNION_AND_BAPTISM,
                "confirmation_requires_communion",
            ));
        }

        if record.is_married
            && !(record.is_confirmed && record.has_received_first_communion && record.is_baptised)
        {
            errors.add(ValidationError::non_field(
                MARRIAGE_REQUIRES_ALL_SACRAMENTS,
                "marriage_requires_confirmation",
            ));
        }

        if record.marital_status == Some(MaritalStatus::Married) && !record.is_married {
            errors.add(ValidationError::non_field(
                MARITAL_STATUS_REQUIRES_MARRIAGE,
                "marital_status_mismatch",
            ));
        }

        errors.into_result()
    }

    /// Build a record from submitted form fields
    pub fn record_from_form(data: &FormData) -> SacramentRecord {
        SacramentRecord {
            is_baptised: flag(data, "is_baptised"),
            has_received_first_communion: flag(data, "has_received_first_communion"),
            is_confirmed: flag(data, "is_confirmed"),
            is_married: flag(data, "is_married"),
            marital_status: text(data, "marital_status").and_then(|s| s.parse().ok()),
        }
    }
}

#[async_trait]
impl ValidateRequest for SacramentValidator {
    async fn validate_request(&self, data: &FormData) -> ValidationResult<()> {
        self.check(&Self::record_from_form(data))
    }
}
