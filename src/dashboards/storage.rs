use async_trait::async_trait;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::shared::enums::OpportunityStage;
use crate::core::shared::error::StoreError;
use crate::core::shared::schema::{companies, contacts, employees, opportunities};
use crate::core::shared::utils::{run_blocking, DbPool};

use super::types::{EntityCounts, StageTotal};

/// Aggregate reads behind the dashboard. Nothing is cached.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn stage_totals(&self, organization_id: Uuid) -> Result<Vec<StageTotal>, StoreError>;

    async fn entity_counts(&self, organization_id: Uuid) -> Result<EntityCounts, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgDashboardStore {
    pool: DbPool,
}

impl PgDashboardStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardStore for PgDashboardStore {
    async fn stage_totals(&self, organization_id: Uuid) -> Result<Vec<StageTotal>, StoreError> {
        let rows = run_blocking(&self.pool, move |conn| {
            opportunities::table
                .filter(opportunities::organization_id.eq(organization_id))
                .group_by(opportunities::stage)
                .select((
                    opportunities::stage,
                    count_star(),
                    sum(opportunities::value),
                ))
                .load::<(OpportunityStage, i64, Option<f64>)>(conn)
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|(stage, count, value)| StageTotal::new(stage, count, value.unwrap_or(0.0)))
            .collect())
    }

    async fn entity_counts(&self, organization_id: Uuid) -> Result<EntityCounts, StoreError> {
        run_blocking(&self.pool, move |conn| {
            let companies = companies::table
                .filter(companies::organization_id.eq(organization_id))
                .count()
                .get_result::<i64>(conn)?;
            let contacts = contacts::table
                .filter(contacts::organization_id.eq(organization_id))
                .count()
                .get_result::<i64>(conn)?;
            let active_employees = employees::table
                .filter(employees::organization_id.eq(organization_id))
                .filter(employees::is_active.eq(true))
                .count()
                .get_result::<i64>(conn)?;

            Ok(EntityCounts {
                companies,
                contacts,
                active_employees,
            })
        })
        .await
    }
}

/// Holds one `(organization, stage, value)` row per opportunity.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDashboardStore {
    opportunities: Arc<RwLock<Vec<(Uuid, OpportunityStage, f64)>>>,
    counts: Arc<RwLock<Vec<(Uuid, EntityCounts)>>>,
}

impl InMemoryDashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_opportunity(&self, organization_id: Uuid, stage: OpportunityStage, value: f64) {
        self.opportunities
            .write()
            .await
            .push((organization_id, stage, value));
    }

    pub async fn set_counts(&self, organization_id: Uuid, counts: EntityCounts) {
        let mut all = self.counts.write().await;
        all.retain(|(org, _)| *org != organization_id);
        all.push((organization_id, counts));
    }
}

#[async_trait]
impl DashboardStore for InMemoryDashboardStore {
    async fn stage_totals(&self, organization_id: Uuid) -> Result<Vec<StageTotal>, StoreError> {
        let rows = self.opportunities.read().await;
        Ok(rows
            .iter()
            .filter(|(org, _, _)| *org == organization_id)
            .map(|(_, stage, value)| StageTotal::new(*stage, 1, *value))
            .collect())
    }

    async fn entity_counts(&self, organization_id: Uuid) -> Result<EntityCounts, StoreError> {
        let all = self.counts.read().await;
        Ok(all
            .iter()
            .find(|(org, _)| *org == organization_id)
            .map(|(_, counts)| counts.clone())
            .unwrap_or_default())
    }
}
