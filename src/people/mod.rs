use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::enums::Department;
use crate::core::shared::error::ApiError;
use crate::core::shared::response::{ApiCreated, ApiResponse, ApiResult, JsonBody, QueryParams};
use crate::core::shared::schema::employees;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;
use crate::security::auth::AuthenticatedUser;
use crate::security::validation::{parse_enum, parse_uuid, Validator};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Employee {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub department: Department,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub job_title: Option<String>,
}

impl CreateEmployeeRequest {
    pub fn validator(&self) -> Validator {
        Validator::new()
            .string_required(&self.first_name, "first_name")
            .max_length(&self.first_name, "first_name", 100)
            .string_required(&self.last_name, "last_name")
            .max_length(&self.last_name, "last_name", 100)
            .string_required(&self.department, "department")
            .optional_email(self.email.as_deref(), "email")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeQuery {
    pub department: Option<String>,
    /// Inactive employees are hidden unless asked for.
    #[serde(default)]
    pub include_inactive: bool,
}

pub fn configure_people_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/operations/employees",
            get(list_employees).post(create_employee),
        )
        .route("/api/operations/employees/:id", get(get_employee))
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<EmployeeQuery>,
) -> ApiResult<Vec<Employee>> {
    let department = query
        .department
        .as_deref()
        .map(|d| parse_enum::<Department>(d, "department"))
        .transpose()?;

    let org_id = user.organization_id;
    let include_inactive = query.include_inactive;
    let employees = run_blocking(&state.conn, move |conn| {
        let mut q = employees::table
            .filter(employees::organization_id.eq(org_id))
            .into_boxed();

        if let Some(department) = department {
            q = q.filter(employees::department.eq(department));
        }
        if !include_inactive {
            q = q.filter(employees::is_active.eq(true));
        }

        q.order((employees::last_name.asc(), employees::first_name.asc()))
            .select(Employee::as_select())
            .load(conn)
    })
    .await?;

    Ok(ApiResponse::ok(employees))
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateEmployeeRequest>,
) -> ApiCreated<Employee> {
    req.validator().validate()?;
    let department: Department = parse_enum(&req.department, "department")?;

    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4(),
        organization_id: user.organization_id,
        user_id: req.user_id,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email,
        job_title: req.job_title,
        department,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let employee = run_blocking(&state.conn, move |conn| {
        diesel::insert_into(employees::table)
            .values(&employee)
            .returning(Employee::as_returning())
            .get_result(conn)
    })
    .await?;

    info!("Added employee {} to {}", employee.id, employee.department);
    Ok(ApiResponse::created(employee))
}

pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Employee> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let employee = run_blocking(&state.conn, move |conn| {
        employees::table
            .filter(employees::id.eq(id))
            .filter(employees::organization_id.eq(org_id))
            .select(Employee::as_select())
            .first(conn)
            .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    Ok(ApiResponse::ok(employee))
}
