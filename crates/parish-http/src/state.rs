//! Shared services handed to every route

use parish_auth::{
    AccountService, IgnoredPaths, LastPathTracker, LoginService, OccupationGate, PasswordHasher,
    SessionConfig, SessionStorage,
};
use parish_core::config::AppConfig;
use parish_core::models::Occupation;
use parish_registry::{LeaderRegistry, MemberRegistry, NewsDesk};
use parish_sms::{SmsNotifier, SmsProvider};
use parish_storage::{MediaStorage, Stores};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub login: LoginService,
    pub tracker: LastPathTracker,
    pub accounts: AccountService,
    pub members: MemberRegistry,
    pub leaders: LeaderRegistry,
    pub news: NewsDesk,
    pub media: Arc<dyn MediaStorage>,
    pub sms: SmsNotifier,
    pub sessions: Arc<dyn SessionStorage>,
    pub session_config: SessionConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .field("login", &self.login)
            .field("sms", &self.sms)
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Stores,
        hasher: Arc<dyn PasswordHasher>,
        media: Arc<dyn MediaStorage>,
        provider: Arc<dyn SmsProvider>,
        sessions: Arc<dyn SessionStorage>,
    ) -> Self {
        let ignored = IgnoredPaths::new(config.ignored_paths.iter().cloned());
        let sms = SmsNotifier::new(
            provider,
            stores.sms.clone(),
            config.church_name.clone(),
            config.request_account_url(),
        );

        Self {
            login: LoginService::new(&stores, hasher.clone()).with_ignored_paths(ignored.clone()),
            tracker: LastPathTracker::new(stores.logins.clone(), ignored),
            accounts: AccountService::new(&stores, hasher, media.clone()),
            members: MemberRegistry::new(&stores, sms.clone(), media.clone()),
            leaders: LeaderRegistry::new(&stores),
            news: NewsDesk::new(stores.news.clone(), media.clone()),
            media,
            session_config: SessionConfig::from_app_config(&config),
            config: Arc::new(config),
            stores,
            sms,
            sessions,
        }
    }

    /// Gate for views reserved to leaders holding `occupation`
    pub fn gate(&self, occupation: Occupation) -> OccupationGate {
        OccupationGate::new(
            occupation,
            self.stores.members.clone(),
            self.stores.leaders.clone(),
        )
    }

    /// Evangelist gate with the view's own denial message
    pub fn evangelist_gate(&self, denial: &str) -> OccupationGate {
        self.gate(Occupation::Evangelist).with_denial_message(denial)
    }

    pub fn secretary_gate(&self) -> OccupationGate {
        self.gate(Occupation::ParishCouncilSecretary)
            .with_denial_message("Only the Parish Council Secretary can access this view.")
    }
}
