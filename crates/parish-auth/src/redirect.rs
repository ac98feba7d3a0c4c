//! Where a user lands after signing in or out

use parish_core::config::default_ignored_paths;
use parish_core::models::{Leader, Occupation, User, UserType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Redirect target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Destination {
    AdminDashboard,
    PastorDashboard,
    EvangelistDashboard,
    SecretaryDashboard,
    AccountantDashboard,
    MemberDashboard,
    Login,
    /// A remembered page
    Path(String),
}

impl Destination {
    pub fn path(&self) -> &str {
        match self {
            Destination::AdminDashboard => "/accounts/admin_dashboard/",
            Destination::PastorDashboard => "/accounts/pastor_dashboard/",
            Destination::EvangelistDashboard => "/accounts/evangelist_dashboard/",
            Destination::SecretaryDashboard => "/accounts/secretary_dashboard/",
            Destination::AccountantDashboard => "/accounts/accountant_dashboard/",
            Destination::MemberDashboard => "/accounts/member_dashboard/",
            Destination::Login => "/accounts/login/",
            Destination::Path(path) => path,
        }
    }

    /// Dashboard for a leader occupation that has its own one
    pub fn for_occupation(occupation: Occupation) -> Option<Self> {
        match occupation {
            Occupation::SeniorPastor => Some(Destination::PastorDashboard),
            Occupation::Evangelist => Some(Destination::EvangelistDashboard),
            Occupation::ParishCouncilSecretary => Some(Destination::SecretaryDashboard),
            Occupation::ParishTreasurer => Some(Destination::AccountantDashboard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Role-based landing page. `leader` is the leader record of the user's
/// linked member, if any.
pub fn dashboard_for(user: &User, leader: Option<&Leader>) -> Destination {
    if user.is_superuser {
        return Destination::AdminDashboard;
    }
    match user.user_type {
        UserType::Admin => Destination::AdminDashboard,
        UserType::ChurchMember => leader
            .and_then(|leader| Destination::for_occupation(leader.occupation))
            .unwrap_or(Destination::MemberDashboard),
    }
}

/// Paths that are never remembered or replayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredPaths {
    paths: BTreeSet<String>,
}

impl IgnoredPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// `Some(path)` when it may be replayed
    pub fn filter<'a>(&self, path: Option<&'a str>) -> Option<&'a str> {
        path.filter(|p| !p.is_empty() && !self.contains(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl Default for IgnoredPaths {
    fn default() -> Self {
        Self::new(default_ignored_paths())
    }
}
