use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::enums::OpportunityStage;
use crate::core::shared::error::ApiError;
use crate::core::shared::response::{
    ApiCreated, ApiResponse, ApiResult, DeletedResponse, JsonBody, QueryParams,
};
use crate::core::shared::schema::opportunities;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;
use crate::security::auth::AuthenticatedUser;
use crate::security::validation::{parse_enum, parse_uuid};

use super::types::{
    CreateOpportunityRequest, ListQuery, Opportunity, OpportunityChangeset,
    UpdateOpportunityRequest,
};
use super::{ensure_company_in_tenant, ensure_contact_in_tenant};

/// Explicit probability wins; otherwise the stage default applies.
pub fn resolve_probability(stage: OpportunityStage, requested: Option<i32>) -> i32 {
    requested.unwrap_or_else(|| stage.default_probability())
}

/// `closed_at` update for a stage change: `None` leaves the column alone.
pub fn closed_at_transition(
    previous: Option<OpportunityStage>,
    next: OpportunityStage,
    now: DateTime<Utc>,
) -> Option<Option<DateTime<Utc>>> {
    let was_closed = previous.is_some_and(|s| s.is_closed());
    match (was_closed, next.is_closed()) {
        (false, true) => Some(Some(now)),
        (true, false) => Some(None),
        _ => None,
    }
}

pub async fn list_opportunities(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Vec<Opportunity>> {
    let stage = query
        .stage
        .as_deref()
        .map(|s| parse_enum::<OpportunityStage>(s, "stage"))
        .transpose()?;

    let org_id = user.organization_id;
    let opportunities = run_blocking(&state.conn, move |conn| {
        let mut q = opportunities::table
            .filter(opportunities::organization_id.eq(org_id))
            .into_boxed();

        if let Some(stage) = stage {
            q = q.filter(opportunities::stage.eq(stage));
        }
        if let Some(company_id) = query.company_id {
            q = q.filter(opportunities::company_id.eq(company_id));
        }
        if let Some(pattern) = query.search_pattern() {
            q = q.filter(
                opportunities::name
                    .ilike(pattern.clone())
                    .or(opportunities::description.ilike(pattern)),
            );
        }

        q.order(opportunities::created_at.desc())
            .limit(query.limit())
            .offset(query.offset())
            .select(Opportunity::as_select())
            .load(conn)
    })
    .await?;

    Ok(ApiResponse::ok(opportunities))
}

pub async fn get_opportunity(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Opportunity> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let opportunity = run_blocking(&state.conn, move |conn| {
        opportunities::table
            .filter(opportunities::id.eq(id))
            .filter(opportunities::organization_id.eq(org_id))
            .select(Opportunity::as_select())
            .first(conn)
            .optional()
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Opportunity not found".into()))?;

    Ok(ApiResponse::ok(opportunity))
}

pub async fn create_opportunity(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateOpportunityRequest>,
) -> ApiCreated<Opportunity> {
    req.validator().validate()?;
    let stage = match req.stage.as_deref() {
        Some(raw) => parse_enum::<OpportunityStage>(raw, "stage")?,
        None => OpportunityStage::default(),
    };
    check_references(&state, user.organization_id, req.contact_id, req.company_id).await?;

    let now = Utc::now();
    let opportunity = Opportunity {
        id: Uuid::new_v4(),
        organization_id: user.organization_id,
        name: req.name.trim().to_string(),
        description: req.description,
        stage,
        value: req.value.unwrap_or(0.0),
        currency: req
            .currency
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| "USD".to_string()),
        probability: resolve_probability(stage, req.probability),
        contact_id: req.contact_id,
        company_id: req.company_id,
        owner_id: user.user_id,
        expected_close_date: req.expected_close_date,
        closed_at: closed_at_transition(None, stage, now).flatten(),
        created_at: now,
        updated_at: now,
    };

    let opportunity = run_blocking(&state.conn, move |conn| {
        diesel::insert_into(opportunities::table)
            .values(&opportunity)
            .returning(Opportunity::as_returning())
            .get_result(conn)
    })
    .await?;

    info!(
        "Created opportunity {} in {} worth {} {}",
        opportunity.id, opportunity.stage, opportunity.value, opportunity.currency
    );
    Ok(ApiResponse::created(opportunity))
}

pub async fn update_opportunity(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateOpportunityRequest>,
) -> ApiResult<Opportunity> {
    let id = parse_uuid(&id, "id")?;
    req.validator().validate()?;
    let stage = req
        .stage
        .as_deref()
        .map(|s| parse_enum::<OpportunityStage>(s, "stage"))
        .transpose()?;
    check_references(&state, user.organization_id, req.contact_id, req.company_id).await?;

    let org_id = user.organization_id;
    let opportunity = run_blocking(&state.conn, move |conn| {
        conn.transaction(|conn| {
            let current: Option<OpportunityStage> = opportunities::table
                .filter(opportunities::id.eq(id))
                .filter(opportunities::organization_id.eq(org_id))
                .select(opportunities::stage)
                .for_update()
                .first(conn)
                .optional()?;
            let Some(current) = current else {
                return Ok(None);
            };

            let now = Utc::now();
            let changes = OpportunityChangeset {
                name: req.name.map(|n| n.trim().to_string()),
                description: req.description,
                stage,
                value: req.value,
                currency: req.currency.map(|c| c.to_uppercase()),
                probability: match (stage, req.probability) {
                    (_, Some(p)) => Some(p),
                    (Some(next), None) if next != current => Some(next.default_probability()),
                    _ => None,
                },
                contact_id: req.contact_id,
                company_id: req.company_id,
                expected_close_date: req.expected_close_date,
                closed_at: stage.and_then(|next| closed_at_transition(Some(current), next, now)),
                updated_at: Some(now),
            };

            diesel::update(opportunities::table.filter(opportunities::id.eq(id)))
                .set(&changes)
                .returning(Opportunity::as_returning())
                .get_result(conn)
                .map(Some)
        })
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Opportunity not found".into()))?;

    Ok(ApiResponse::ok(opportunity))
}

pub async fn delete_opportunity(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    let id = parse_uuid(&id, "id")?;
    let org_id = user.organization_id;
    let deleted = run_blocking(&state.conn, move |conn| {
        diesel::delete(
            opportunities::table
                .filter(opportunities::id.eq(id))
                .filter(opportunities::organization_id.eq(org_id)),
        )
        .execute(conn)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Opportunity not found".into()));
    }
    info!("Deleted opportunity {}", id);
    Ok(ApiResponse::ok(DeletedResponse::new(id)))
}

async fn check_references(
    state: &AppState,
    organization_id: Uuid,
    contact_id: Option<Uuid>,
    company_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(contact_id) = contact_id {
        ensure_contact_in_tenant(state, organization_id, contact_id).await?;
    }
    if let Some(company_id) = company_id {
        ensure_company_in_tenant(state, organization_id, company_id).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_defaults_from_stage() {
        assert_eq!(resolve_probability(OpportunityStage::Proposal, None), 50);
        assert_eq!(resolve_probability(OpportunityStage::Proposal, Some(65)), 65);
        assert_eq!(resolve_probability(OpportunityStage::Lost, None), 0);
    }

    #[test]
    fn test_closing_sets_closed_at() {
        let now = Utc::now();
        assert_eq!(
            closed_at_transition(Some(OpportunityStage::Negotiation), OpportunityStage::Won, now),
            Some(Some(now))
        );
        assert_eq!(
            closed_at_transition(None, OpportunityStage::Lost, now),
            Some(Some(now))
        );
    }

    #[test]
    fn test_reopening_clears_closed_at() {
        let now = Utc::now();
        assert_eq!(
            closed_at_transition(Some(OpportunityStage::Won), OpportunityStage::Qualified, now),
            Some(None)
        );
    }

    #[test]
    fn test_staying_open_or_closed_leaves_closed_at() {
        let now = Utc::now();
        assert_eq!(
            closed_at_transition(Some(OpportunityStage::New), OpportunityStage::Proposal, now),
            None
        );
        assert_eq!(
            closed_at_transition(Some(OpportunityStage::Won), OpportunityStage::Lost, now),
            None
        );
        assert_eq!(closed_at_transition(None, OpportunityStage::New, now), None);
    }
}
