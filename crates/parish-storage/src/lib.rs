//! # parish-storage
//!
//! Persistence for the parish service. Each concern (members, leaders,
//! accounts, login history, the SMS log, news and organisation units) is a
//! small async trait so the services above can run against PostgreSQL in
//! production and [`MemoryStore`] in tests.

pub mod error;
pub mod media;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use media::{LocalMediaStorage, MediaStorage};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use traits::{
    LeaderFilter, LeaderStore, LeaderWithMember, LoginHistoryStore, MemberFilter, MemberStore,
    NewsStore, NewsWithMedia, OrganisationStore, SmsLogStore, UserStore,
};

use std::sync::Arc;

/// Every store the services need, shared behind trait objects
#[derive(Clone)]
pub struct Stores {
    pub members: Arc<dyn MemberStore>,
    pub leaders: Arc<dyn LeaderStore>,
    pub users: Arc<dyn UserStore>,
    pub logins: Arc<dyn LoginHistoryStore>,
    pub sms: Arc<dyn SmsLogStore>,
    pub news: Arc<dyn NewsStore>,
    pub organisation: Arc<dyn OrganisationStore>,
}

impl Stores {
    /// Use one backend for every store
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: MemberStore
            + LeaderStore
            + UserStore
            + LoginHistoryStore
            + SmsLogStore
            + NewsStore
            + OrganisationStore
            + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            members: backend.clone(),
            leaders: backend.clone(),
            users: backend.clone(),
            logins: backend.clone(),
            sms: backend.clone(),
            news: backend.clone(),
            organisation: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(MemoryStore::new())
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
