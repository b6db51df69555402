use anyhow::Context;
use dotenvy::dotenv;
use log::{error, info};

use hubserver::core::config::AppConfig;
use hubserver::main_module::{create_app_state, init_logging, run_axum_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("No .env loaded: {e}");
    }
    init_logging();
    info!("Starting Hub server {}...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let state = create_app_state(config).await?;

    if let Err(e) = run_axum_server(state).await {
        error!("Server stopped with error: {}", e);
        return Err(e.into());
    }

    info!("Hub server stopped");
    Ok(())
}
