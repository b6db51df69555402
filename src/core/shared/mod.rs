pub mod enums;
pub mod error;
pub mod response;
pub mod schema;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod utils;

pub use enums::*;
pub use error::{ApiError, FieldError, StoreError};
pub use response::{ApiCreated, ApiResponse, ApiResult, DeletedResponse, JsonBody, QueryParams};
pub use state::AppState;
pub use utils::{create_conn, create_lazy_conn, run_blocking, sanitize_path_component, DbPool};
