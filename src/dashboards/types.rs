use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::shared::enums::{OpportunityStage, Zone};

/// Count and summed value of the opportunities sitting in one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTotal {
    pub stage: OpportunityStage,
    pub count: i64,
    pub value: f64,
}

impl StageTotal {
    pub fn new(stage: OpportunityStage, count: i64, value: f64) -> Self {
        Self {
            stage,
            count,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityStats {
    pub total_opportunities: i64,
    pub won_opportunities: i64,
    pub lost_opportunities: i64,
    pub open_opportunities: i64,
    /// Percentage of all opportunities that were won, two decimals.
    pub conversion_rate: f64,
    /// Sum of value over WON opportunities.
    pub total_revenue: f64,
    /// Sum of value over opportunities that are neither WON nor LOST.
    pub pipeline_value: f64,
    /// One entry per stage in pipeline order, zero-filled.
    pub pipeline: Vec<StageTotal>,
}

impl OpportunityStats {
    /// Folds per-stage rows into the KPI set. Rows for the same stage are summed.
    pub fn from_stage_totals<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = StageTotal>,
    {
        let mut pipeline: Vec<StageTotal> = OpportunityStage::ALL
            .iter()
            .map(|stage| StageTotal::new(*stage, 0, 0.0))
            .collect();

        for row in rows {
            if let Some(slot) = pipeline.iter_mut().find(|s| s.stage == row.stage) {
                slot.count += row.count;
                slot.value += row.value;
            }
        }

        let total_opportunities: i64 = pipeline.iter().map(|s| s.count).sum();
        let stage = |wanted: OpportunityStage| {
            pipeline
                .iter()
                .find(|s| s.stage == wanted)
                .map(|s| (s.count, s.value))
                .unwrap_or((0, 0.0))
        };
        let (won_opportunities, total_revenue) = stage(OpportunityStage::Won);
        let (lost_opportunities, _) = stage(OpportunityStage::Lost);

        let pipeline_value: f64 = pipeline
            .iter()
            .filter(|s| !s.stage.is_closed())
            .map(|s| s.value)
            .sum();

        Self {
            total_opportunities,
            won_opportunities,
            lost_opportunities,
            open_opportunities: total_opportunities - won_opportunities - lost_opportunities,
            conversion_rate: conversion_rate(won_opportunities, total_opportunities),
            total_revenue: round2(total_revenue),
            pipeline_value: round2(pipeline_value),
            pipeline,
        }
    }
}

pub fn conversion_rate(won: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(won as f64 / total as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub companies: i64,
    pub contacts: i64,
    pub active_employees: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub companies: i64,
    pub contacts: i64,
    pub active_employees: i64,
    pub open_opportunities: i64,
    pub tasks_by_zone: BTreeMap<Zone, i64>,
    pub opportunities: OpportunityStats,
}

impl DashboardSummary {
    pub fn new(
        counts: EntityCounts,
        zone_counts: Vec<(Zone, i64)>,
        opportunities: OpportunityStats,
    ) -> Self {
        let mut tasks_by_zone: BTreeMap<Zone, i64> = Zone::ALL.iter().map(|z| (*z, 0)).collect();
        for (zone, count) in zone_counts {
            *tasks_by_zone.entry(zone).or_default() += count;
        }

        Self {
            companies: counts.companies,
            contacts: counts.contacts,
            active_employees: counts.active_employees,
            open_opportunities: opportunities.open_opportunities,
            tasks_by_zone,
            opportunities,
        }
    }
}
