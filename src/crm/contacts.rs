use axum::extract::{Path, State};
use chrono::Utc;
use diesel::prelude::*;
use log::info;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::response::{
    ApiCreated, ApiResponse, ApiResult, DeletedResponse, JsonBody, QueryParams,
};
use crate::core::shared::schema::contacts;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;
use crate::security::auth::AuthenticatedUser;
use crate::security::validation::parse_uuid;

use super::ensure_company_in_tenant;
use super::types::{Contact, CreateContactRequest, ListQuery, UpdateContactRequest};

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Vec<Contact>> {
    let org_id = user.organization_id;
    let contacts = run_blocking(&state.conn, move |conn| {
        let mut q = contacts::table
            .filter(contacts::organization_id.eq(org_id))
            .into_boxed();

        if let Some(company_id) = query.company_id {
            q = q.filter(contacts::company_id.eq(company_id));
        }

        if let Some(pattern) = query.search_pattern() {
            q = q.filter(
                contacts::first_name
                    .ilike(pattern.clone())
                    .or(contacts::last_name.ilike(pattern.clone()))
                    .or(contacts::email.ilike(pattern.clone()))
                    .or(contacts::job_title.ilike(pattern)),
            );
        }

        q.order(contacts::created_at.desc())
            .limit(query.limit())
            .offset(query.offset())
            .select(Contact::as_select())
            .load(conn)
    })
    .await?;

    Ok(ApiResponse::ok(contacts))
}

pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Contact> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let contact = run_blocking(&state.conn, move |conn| {
        contacts::table
            .filter(contacts::id.eq(id))
            .filter(contacts::organization_id.eq(org_id))
            .select(Contact::as_select())
            .first(conn)
            .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Contact not found".into()))?;

    Ok(ApiResponse::ok(contact))
}

pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateContactRequest>,
) -> ApiCreated<Contact> {
    req.validator().validate()?;
    if let Some(company_id) = req.company_id {
        ensure_company_in_tenant(&state, user.organization_id, company_id).await?;
    }

    let contact = req.into_contact(user.organization_id);
    let contact = run_blocking(&state.conn, move |conn| {
        diesel::insert_into(contacts::table)
            .values(&contact)
            .returning(Contact::as_returning())
            .get_result(conn)
    })
    .await?;

    info!("Created contact {}", contact.id);
    Ok(ApiResponse::created(contact))
}

pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(mut req): JsonBody<UpdateContactRequest>,
) -> ApiResult<Contact> {
    let id = parse_uuid(&id, "id")?;
    req.validator().validate()?;
    if let Some(company_id) = req.company_id {
        ensure_company_in_tenant(&state, user.organization_id, company_id).await?;
    }
    req.first_name = req.first_name.map(|n| n.trim().to_string());
    req.last_name = req.last_name.map(|n| n.trim().to_string());
    req.updated_at = Some(Utc::now());

    let org_id = user.organization_id;
    let contact = run_blocking(&state.conn, move |conn| {
        diesel::update(
            contacts::table
                .filter(contacts::id.eq(id))
                .filter(contacts::organization_id.eq(org_id)),
        )
        .set(&req)
        .returning(Contact::as_returning())
        .get_result(conn)
        .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Contact not found".into()))?;

    Ok(ApiResponse::ok(contact))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let deleted = run_blocking(&state.conn, move |conn| {
        diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id))
                .filter(contacts::organization_id.eq(org_id)),
        )
        .execute(conn)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Contact not found".into()));
    }
    info!("Deleted contact {}", id);
    Ok(ApiResponse::ok(DeletedResponse::new(id)))
}
