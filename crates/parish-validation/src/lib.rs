//! # parish-validation
//!
//! Form validation for the parish service. Field rules (required, phone
//! format, length) and form-level rules (sacrament ordering, password
//! confirmation) are collected into [`Rules`] and every failure is reported
//! together so it can be flashed back to the user.
//!
//! ```rust
//! use parish_validation::forms::member_rules;
//! use parish_validation::FormData;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mut form = FormData::new();
//! form.insert("full_name".into(), json!("Juma Ally"));
//! form.insert("gender".into(), json!("Male"));
//! form.insert("phone_number".into(), json!("+255712345678"));
//! form.insert("is_confirmed".into(), json!(true));
//!
//! let errors = member_rules().check(&form).await.unwrap_err();
//! assert_eq!(
//!     errors.messages(),
//!     vec!["A member cannot be confirmed without First Communion and Baptism."]
//! );
//! # });
//! ```

pub mod error;
pub mod forms;
pub mod rules;
pub mod traits;
pub mod validators;

pub use error::{ValidationError, ValidationErrors, ValidationResult, NON_FIELD_ERRORS};
pub use rules::Rules;
pub use traits::{FormData, Validate, ValidateField, ValidateRequest, ValidationRule};
pub use validators::{MinLengthValidator, PatternValidator, RequiredValidator, SacramentValidator};
