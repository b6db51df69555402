//! HTTP handlers for the operations board
use axum::extract::{Path, State};
use std::sync::Arc;

use crate::core::shared::enums::{Department, Zone};
use crate::core::shared::error::ApiError;
use crate::core::shared::response::{ApiCreated, ApiResponse, ApiResult, DeletedResponse, JsonBody};
use crate::core::shared::state::AppState;
use crate::security::auth::{AuthenticatedUser, OptionalAuth};
use crate::security::validation::{parse_enum, parse_uuid};
use crate::tasks::board;
use crate::tasks::types::{
    AssignDepartmentRequest, CreateTaskRequest, MoveZoneRequest, Task, TaskZoneBoard,
};

pub async fn handle_department_board(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(department): Path<String>,
) -> ApiResult<TaskZoneBoard> {
    let department: Department = parse_enum(&department, "department")?;
    let board =
        board::get_tasks_by_department(state.task_store.as_ref(), user.organization_id, department)
            .await?;
    Ok(ApiResponse::ok(board))
}

/// The acting user is optional here so that a missing session is reported
/// as 401 before the path or body are looked at.
pub async fn handle_move_task_zone(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuth,
    Path(id): Path<String>,
    payload: Result<JsonBody<MoveZoneRequest>, ApiError>,
) -> ApiResult<Task> {
    if auth.user_id().is_none() {
        return Err(ApiError::Unauthorized("Authentication required".into()));
    }
    let task_id = parse_uuid(&id, "id")?;
    let JsonBody(payload) = payload?;
    let zone: Zone = parse_enum(&payload.zone, "zone")?;
    let task = board::move_task_to_zone(
        state.task_store.as_ref(),
        auth.organization_id(),
        task_id,
        zone,
        auth.user_id(),
    )
    .await?;
    Ok(ApiResponse::ok(task))
}

pub async fn handle_assign_task_department(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AssignDepartmentRequest>,
) -> ApiResult<Task> {
    let task_id = parse_uuid(&id, "id")?;
    let department: Department = parse_enum(&payload.department, "department")?;
    let task = board::assign_task_to_department(
        state.task_store.as_ref(),
        user.organization_id,
        task_id,
        department,
    )
    .await?;
    Ok(ApiResponse::ok(task))
}

pub async fn handle_task_create(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateTaskRequest>,
) -> ApiCreated<Task> {
    let task = board::create_task(
        state.task_store.as_ref(),
        user.organization_id,
        user.user_id,
        payload,
    )
    .await?;
    Ok(ApiResponse::created(task))
}

pub async fn handle_task_get(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let task_id = parse_uuid(&id, "id")?;
    let task = board::get_task(state.task_store.as_ref(), user.organization_id, task_id).await?;
    Ok(ApiResponse::ok(task))
}

pub async fn handle_task_delete(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    let task_id = parse_uuid(&id, "id")?;
    board::delete_task(state.task_store.as_ref(), user.organization_id, task_id).await?;
    Ok(ApiResponse::ok(DeletedResponse::new(task_id)))
}
