//! Hearth server binary.
//!
//! Wires configuration, storage, the household service and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hearth-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open storage: `PostgreSQL` with migrations when a database URL is
//!    configured, in-memory otherwise
//! 4. Build the household service
//! 5. Serve the HTTP API

mod error;

use std::path::Path;
use std::sync::Arc;

use hearth_api::{start_server, AppState, ServerConfig};
use hearth_core::config::LoggingConfig;
use hearth_core::{HearthConfig, HouseholdService, InviteLinks, Notifier, PinHasher};
use hearth_db::{ActivityStore, EventLog, PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "hearth-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, storage, or the server fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        host = config.server.host,
        port = config.server.port,
        pin_iterations = config.security.pin_iterations,
        "hearth-server starting"
    );

    // 3. Open storage.
    let (log, activities, pool) = open_storage(&config).await?;
    info!(backend = log.backend(), "Event log ready");

    // 4. Build the service.
    let service = HouseholdService::new(
        Arc::new(log),
        Arc::new(activities),
        Notifier::default(),
        PinHasher::new(config.security.pin_iterations),
        InviteLinks::new(config.invites.base_url.as_str()),
    );
    let state = AppState::new(Arc::new(service)).with_activity_defaults(config.activity.clone());

    // 5. Serve.
    let served = start_server(&ServerConfig::from(&config.server), Arc::new(state)).await;

    if let Some(pool) = pool {
        pool.close().await;
    }
    served?;
    info!("hearth-server stopped");
    Ok(())
}

/// Load configuration from `hearth-config.yaml`, or defaults (plus
/// environment overrides) if the file does not exist.
fn load_config() -> Result<HearthConfig, ServerError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(HearthConfig::from_file(config_path)?)
    } else {
        let mut config = HearthConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Open the configured backends. The pool is returned so it can be
/// closed on shutdown.
async fn open_storage(
    config: &HearthConfig,
) -> Result<(EventLog, ActivityStore, Option<PostgresPool>), ServerError> {
    let Some(url) = config.database.url.as_deref() else {
        info!("No database URL configured, using in-memory storage");
        return Ok((EventLog::in_memory(), ActivityStore::in_memory(), None));
    };

    let pool = PostgresPool::connect(
        &PostgresConfig::new(url).with_max_connections(config.database.max_connections),
    )
    .await?;
    pool.run_migrations().await?;
    info!("Database migrations applied");

    Ok((
        EventLog::Postgres(pool.event_store()),
        ActivityStore::Postgres(pool.activity_store()),
        Some(pool),
    ))
}
