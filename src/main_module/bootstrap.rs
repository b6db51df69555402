//! Bootstrap and application initialization logic

use anyhow::Context;
use log::{error, info, warn};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::core::config::AppConfig;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{self, create_conn, DbPool};
use crate::security::jwt::{JwtConfig, JwtManager};

/// Structured logging for both `tracing` spans and `log` records. `RUST_LOG` wins
/// over the built-in filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,hubserver=debug"));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
    {
        eprintln!("Logging already initialized: {e}");
    }
}

pub fn init_database(config: &AppConfig) -> anyhow::Result<DbPool> {
    let pool = create_conn(&config.database).context("Failed to create database pool")?;

    info!("Running database migrations...");
    if let Err(e) = utils::run_migrations(&pool) {
        error!("Failed to run migrations: {}", e);
        warn!("Continuing despite migration errors - database might be partially migrated");
    } else {
        info!("Database migrations completed successfully");
    }

    Ok(pool)
}

#[cfg(feature = "drive")]
pub async fn init_drive(config: &AppConfig) -> Option<aws_sdk_s3::Client> {
    if !config.drive.is_configured() {
        warn!("DRIVE_SERVER or credentials not set, file endpoints will answer 503");
        return None;
    }
    let client = utils::create_s3_operator(&config.drive).await;
    info!(
        "Drive initialized at {} (bucket {})",
        config.drive.server, config.drive.bucket
    );
    Some(client)
}

pub fn init_jwt(config: &AppConfig) -> anyhow::Result<JwtManager> {
    let jwt_config = JwtConfig {
        issuer: config.auth.issuer.clone(),
        audience: config.auth.audience.clone(),
        ..Default::default()
    };
    JwtManager::new(jwt_config, &config.auth.jwt_secret).context("Failed to initialize JWT manager")
}

pub async fn create_app_state(config: AppConfig) -> anyhow::Result<Arc<AppState>> {
    let pool = init_database(&config)?;
    let jwt = init_jwt(&config)?;

    #[cfg(feature = "drive")]
    let drive = init_drive(&config).await;

    info!("Server configured to listen on {}", config.bind_address());
    let state = AppState::new(config, pool, jwt);

    #[cfg(feature = "drive")]
    let state = state.with_drive(drive);

    Ok(Arc::new(state))
}
