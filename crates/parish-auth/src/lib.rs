//! # parish-auth: access control and sign-in for the parish service
//!
//! Occupation-gated access for leader views, password hashing, cookie
//! sessions, the login/logout redirect rules with last-page replay, and
//! member self-service for accounts.

pub mod access;
pub mod account;
pub mod error;
pub mod hashing;
pub mod login;
pub mod redirect;
pub mod session;
pub mod tracker;

// Error handling
pub use error::AuthError;

// Access gates
pub use access::{require_admin, require_church_member, LeaderContext, OccupationGate};

// Login flow
pub use login::{client_ip, LoginOutcome, LoginRequest, LoginService};
pub use redirect::{dashboard_for, Destination, IgnoredPaths};
pub use tracker::LastPathTracker;

// Sessions
pub use session::{CookieSameSite, MemorySessionStore, SessionConfig, SessionData, SessionId, SessionStorage};

// Self-service
pub use account::{AccountService, IdentifiedMember};

// Hashing
pub use hashing::{hasher_for, PasswordHasher};
#[cfg(feature = "argon2")]
pub use hashing::Argon2Hasher;
#[cfg(feature = "bcrypt")]
pub use hashing::BcryptHasher;

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
