//! Wiring the services from configuration

use anyhow::{anyhow, Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use parish_auth::{hasher_for, MemorySessionStore, PasswordHasher, SessionStorage};
use parish_core::config::AppConfig;
use parish_http::AppState;
use parish_sms::{BeemProvider, MockSmsProvider, SmsConfig, SmsProvider};
use parish_storage::{LocalMediaStorage, PgStore, Stores};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

/// Inline uploads are base64 in JSON, so allow a few photos per request
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// YAML file when given, otherwise `PARISH_*` environment variables
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::from_env().context("Invalid PARISH_* configuration"),
    }
}

/// PostgreSQL when a database URL is configured, in-memory otherwise
pub async fn open_stores(config: &AppConfig) -> Result<Stores> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("No database configured, records are kept in memory only");
        return Ok(Stores::in_memory());
    };

    let store = PgStore::connect(database_url)
        .await
        .context("Failed to connect to the database")?;
    store.migrate().await.context("Failed to migrate the database")?;
    Ok(Stores::from_backend(store))
}

pub fn password_hasher(config: &AppConfig) -> Result<Arc<dyn PasswordHasher>> {
    let hasher = hasher_for("argon2", !config.environment.is_production())?;
    Ok(Arc::from(hasher))
}

/// Beem gateway from `BEEM_*` settings. Outside production a missing
/// configuration falls back to a gateway that only records messages.
pub fn sms_provider<F>(config: &AppConfig, lookup: F) -> Result<Arc<dyn SmsProvider>>
where
    F: Fn(&str) -> Option<String>,
{
    match SmsConfig::from_lookup(lookup) {
        Ok(sms_config) => Ok(Arc::new(BeemProvider::new(sms_config)?)),
        Err(err) if !config.environment.is_production() => {
            warn!("{}; SMS messages will not leave this process", err);
            Ok(Arc::new(MockSmsProvider::new()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn build_state(config: AppConfig) -> Result<AppState> {
    let stores = open_stores(&config).await?;
    let hasher = password_hasher(&config)?;
    let provider = sms_provider(&config, |key| std::env::var(key).ok())?;
    let media = Arc::new(LocalMediaStorage::new(config.media_root.clone()));
    let sessions: Arc<dyn SessionStorage> = Arc::new(MemorySessionStore::new());

    Ok(AppState::new(config, stores, hasher, media, provider, sessions))
}

pub fn app(state: AppState) -> Router {
    parish_http::router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
}

pub async fn serve(state: AppState) -> Result<()> {
    let bind_address = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;

    parish_http::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &bind_address);
    let cleanup = tokio::spawn(clean_sessions(state.sessions.clone()));

    let result = axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    cleanup.abort();
    parish_http::log_shutdown_info(env!("CARGO_PKG_NAME"));
    result.map_err(|err| anyhow!("Server failed: {}", err))
}

async fn clean_sessions(sessions: Arc<dyn SessionStorage>) {
    let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        match sessions.cleanup_expired_sessions().await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Expired sessions removed"),
            Err(err) => warn!("Session cleanup failed: {}", err),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received terminate signal, initiating graceful shutdown"),
    }
}
