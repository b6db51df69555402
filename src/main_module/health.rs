//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::RunQueryDsl;
use log::warn;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = match run_blocking(&state.conn, |conn| {
        diesel::sql_query("SELECT 1").execute(conn)
    })
    .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    let status = if db_ok { "healthy" } else { "degraded" };
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    #[cfg(feature = "drive")]
    let drive_ok = state.drive.is_some();
    #[cfg(not(feature = "drive"))]
    let drive_ok = false;

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": "hubserver",
            "version": env!("CARGO_PKG_VERSION"),
            "database": db_ok,
            "drive": drive_ok
        })),
    )
}

pub async fn health_check_simple() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "hubserver",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
