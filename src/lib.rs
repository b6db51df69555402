pub mod core;
pub mod crm;
pub mod dashboards;
pub mod drive;
pub mod main_module;
pub mod people;
pub mod security;
pub mod tasks;

pub use crate::core::config::AppConfig;
pub use crate::core::shared::state::AppState;
pub use crate::main_module::{build_router, create_app_state, run_axum_server};
