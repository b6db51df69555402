pub mod board;
pub mod handlers;
pub mod store;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use board::{assign_task_to_department, get_tasks_by_department, move_task_to_zone};
pub use handlers::*;
pub use store::{InMemoryTaskStore, PgTaskStore, TaskStore};
pub use types::{Task, TaskZoneBoard};

pub fn configure_task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/operations/departments/:department/board",
            get(handle_department_board),
        )
        .route("/api/operations/tasks", post(handle_task_create))
        .route(
            "/api/operations/tasks/:id",
            get(handle_task_get).delete(handle_task_delete),
        )
        .route("/api/operations/tasks/:id/zone", post(handle_move_task_zone))
        .route(
            "/api/operations/tasks/:id/department",
            post(handle_assign_task_department),
        )
}
