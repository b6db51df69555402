pub mod handlers;
pub mod storage;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use storage::*;
pub use types::*;

pub fn configure_dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dashboard/opportunities",
            get(handle_opportunities_stats),
        )
        .route("/api/dashboard/summary", get(handle_dashboard_summary))
}
