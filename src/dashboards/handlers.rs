use axum::extract::State;
use log::error;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::response::{ApiResponse, ApiResult};
use crate::core::shared::state::AppState;
use crate::security::auth::AuthenticatedUser;
use crate::tasks::store::TaskStore;

use super::storage::DashboardStore;
use super::types::{DashboardSummary, OpportunityStats};

/// Opportunity KPIs for one tenant, recomputed on every call.
pub async fn get_opportunities_stats(
    store: &dyn DashboardStore,
    organization_id: Uuid,
) -> Result<OpportunityStats, ApiError> {
    let rows = store.stage_totals(organization_id).await.map_err(|e| {
        error!("Failed to aggregate opportunities: {}", e);
        ApiError::Database(e.to_string())
    })?;
    Ok(OpportunityStats::from_stage_totals(rows))
}

pub async fn get_dashboard_summary(
    dashboard: &dyn DashboardStore,
    tasks: &dyn TaskStore,
    organization_id: Uuid,
) -> Result<DashboardSummary, ApiError> {
    let opportunities = get_opportunities_stats(dashboard, organization_id).await?;
    let counts = dashboard.entity_counts(organization_id).await?;
    let zone_counts = tasks.count_by_zone(organization_id).await?;
    Ok(DashboardSummary::new(counts, zone_counts, opportunities))
}

pub async fn handle_opportunities_stats(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<OpportunityStats> {
    let stats = get_opportunities_stats(state.dashboard_store.as_ref(), user.organization_id).await?;
    Ok(ApiResponse::ok(stats))
}

pub async fn handle_dashboard_summary(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<DashboardSummary> {
    let summary = get_dashboard_summary(
        state.dashboard_store.as_ref(),
        state.task_store.as_ref(),
        user.organization_id,
    )
    .await?;
    Ok(ApiResponse::ok(summary))
}
