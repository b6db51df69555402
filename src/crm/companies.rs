use axum::extract::{Path, State};
use chrono::Utc;
use diesel::prelude::*;
use log::info;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::response::{
    ApiCreated, ApiResponse, ApiResult, DeletedResponse, JsonBody, QueryParams,
};
use crate::core::shared::schema::companies;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;
use crate::security::auth::AuthenticatedUser;
use crate::security::validation::parse_uuid;

use super::types::{Company, CreateCompanyRequest, ListQuery, UpdateCompanyRequest};

pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Vec<Company>> {
    let org_id = user.organization_id;
    let companies = run_blocking(&state.conn, move |conn| {
        let mut q = companies::table
            .filter(companies::organization_id.eq(org_id))
            .into_boxed();

        if let Some(pattern) = query.search_pattern() {
            q = q.filter(
                companies::name
                    .ilike(pattern.clone())
                    .or(companies::email.ilike(pattern.clone()))
                    .or(companies::industry.ilike(pattern.clone()))
                    .or(companies::city.ilike(pattern)),
            );
        }

        q.order(companies::created_at.desc())
            .limit(query.limit())
            .offset(query.offset())
            .select(Company::as_select())
            .load(conn)
    })
    .await?;

    Ok(ApiResponse::ok(companies))
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Company> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let company = run_blocking(&state.conn, move |conn| {
        companies::table
            .filter(companies::id.eq(id))
            .filter(companies::organization_id.eq(org_id))
            .select(Company::as_select())
            .first(conn)
            .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Company not found".into()))?;

    Ok(ApiResponse::ok(company))
}

pub async fn create_company(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateCompanyRequest>,
) -> ApiCreated<Company> {
    req.validator().validate()?;

    let company = req.into_company(user.organization_id);
    let company = run_blocking(&state.conn, move |conn| {
        diesel::insert_into(companies::table)
            .values(&company)
            .returning(Company::as_returning())
            .get_result(conn)
    })
    .await?;

    info!("Created company {} ({})", company.id, company.name);
    Ok(ApiResponse::created(company))
}

pub async fn update_company(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(mut req): JsonBody<UpdateCompanyRequest>,
) -> ApiResult<Company> {
    let id = parse_uuid(&id, "id")?;
    req.validator().validate()?;
    req.name = req.name.map(|n| n.trim().to_string());
    req.updated_at = Some(Utc::now());

    let org_id = user.organization_id;
    let company = run_blocking(&state.conn, move |conn| {
        diesel::update(
            companies::table
                .filter(companies::id.eq(id))
                .filter(companies::organization_id.eq(org_id)),
        )
        .set(&req)
        .returning(Company::as_returning())
        .get_result(conn)
        .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Company not found".into()))?;

    Ok(ApiResponse::ok(company))
}

pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let deleted = run_blocking(&state.conn, move |conn| {
        diesel::delete(
            companies::table
                .filter(companies::id.eq(id))
                .filter(companies::organization_id.eq(org_id)),
        )
        .execute(conn)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Company not found".into()));
    }
    info!("Deleted company {}", id);
    Ok(ApiResponse::ok(DeletedResponse::new(id)))
}
