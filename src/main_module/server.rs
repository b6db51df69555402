//! HTTP server initialization and routing

use axum::{routing::get, Router};
use log::{error, info};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::shared::state::AppState;
use crate::crm::configure_crm_routes;
use crate::dashboards::configure_dashboard_routes;
use crate::drive::configure_drive_routes;
use crate::people::configure_people_routes;
use crate::security::cors::create_cors_layer;
use crate::tasks::configure_task_routes;

use super::{health_check, health_check_simple, shutdown_signal};

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/health", get(health_check_simple))
        .route("/api/health", get(health_check))
        .merge(configure_crm_routes())
        .merge(configure_task_routes())
        .merge(configure_people_routes())
        .merge(configure_dashboard_routes())
        .merge(configure_drive_routes(app_state.config.drive.max_upload_bytes));

    let cors = create_cors_layer(&app_state.config.server.cors_allowed_origins);

    api_router
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
