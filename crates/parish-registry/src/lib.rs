//! # parish-registry
//!
//! The parish office workflows built on the stores: registering and
//! approving members (with their SMS notifications), promoting members to
//! leaders, the filtered listings and statistics behind the dashboards, and
//! news posts with their media.
//!
//! Forms arrive as [`FormData`](parish_validation::FormData) and are
//! validated with the rule sets from `parish-validation` before anything is
//! saved.

pub mod calendar;
pub mod error;
pub mod forms;
pub mod leaders;
pub mod listing;
pub mod members;
pub mod news;
pub mod reports;

pub use calendar::ensure_current_year;
pub use error::RegistryError;
pub use leaders::{LeaderProfile, LeaderRegistry, LeaderScope, LeadersDistribution, LeadersHome, NamedCount};
pub use listing::{GenderTotals, LeaderListing, LeaderRow, ListingQuery, MemberListing, MemberRow};
pub use members::{MemberProfile, MemberRegistry, MemberSaved, MemberScope, MembersHome, NextStep};
pub use news::{NewsDesk, NewsRow, NewsUpload};
pub use reports::{members_report, CellStats, MembersReport, SacramentStats, StatusCounts};

pub type RegistryResult<T> = Result<T, RegistryError>;
