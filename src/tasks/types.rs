//! Types for the tasks module
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::shared::enums::{Department, TaskPriority, Zone};
use crate::core::shared::schema::tasks;
use crate::security::validation::Validator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Task {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub department: Department,
    pub zone: Zone,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub department: String,
    pub zone: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    pub fn validator(&self) -> Validator {
        Validator::new()
            .string_required(&self.title, "title")
            .max_length(&self.title, "title", 255)
            .string_required(&self.department, "department")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveZoneRequest {
    pub zone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignDepartmentRequest {
    pub department: String,
}

/// A department's tasks laid out by zone. Every zone is present, possibly empty.
#[derive(Debug, Clone, Serialize)]
pub struct TaskZoneBoard {
    pub department: Department,
    pub zones: BTreeMap<Zone, Vec<Task>>,
    pub total: usize,
}

impl TaskZoneBoard {
    /// Partitions tasks by zone, newest first inside each zone.
    pub fn from_tasks(department: Department, tasks: Vec<Task>) -> Self {
        let mut zones: BTreeMap<Zone, Vec<Task>> =
            Zone::ALL.iter().map(|z| (*z, Vec::new())).collect();
        let total = tasks.len();

        for task in tasks {
            zones.entry(task.zone).or_default().push(task);
        }
        for column in zones.values_mut() {
            column.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Self {
            department,
            zones,
            total,
        }
    }

    pub fn zone(&self, zone: Zone) -> &[Task] {
        self.zones.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }
}
