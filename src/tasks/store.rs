use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::shared::enums::{Department, Zone};
use crate::core::shared::error::StoreError;
use crate::core::shared::schema::{employees, tasks};
use crate::core::shared::utils::{run_blocking, DbPool};
use crate::tasks::types::Task;

/// Persistence seam for the kanban board. Every call is scoped to one tenant.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_by_department(
        &self,
        organization_id: Uuid,
        department: Department,
    ) -> Result<Vec<Task>, StoreError>;

    async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn insert(&self, task: Task) -> Result<Task, StoreError>;

    async fn update_zone(
        &self,
        organization_id: Uuid,
        id: Uuid,
        zone: Zone,
    ) -> Result<Option<Task>, StoreError>;

    async fn update_department(
        &self,
        organization_id: Uuid,
        id: Uuid,
        department: Department,
    ) -> Result<Option<Task>, StoreError>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    async fn count_by_zone(&self, organization_id: Uuid) -> Result<Vec<(Zone, i64)>, StoreError>;

    async fn employee_exists(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: DbPool,
}

impl PgTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_by_department(
        &self,
        organization_id: Uuid,
        department: Department,
    ) -> Result<Vec<Task>, StoreError> {
        run_blocking(&self.pool, move |conn| {
            tasks::table
                .filter(tasks::organization_id.eq(organization_id))
                .filter(tasks::department.eq(department))
                .order(tasks::created_at.desc())
                .select(Task::as_select())
                .load(conn)
        })
        .await
    }

    async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        run_blocking(&self.pool, move |conn| {
            tasks::table
                .filter(tasks::id.eq(id))
                .filter(tasks::organization_id.eq(organization_id))
                .select(Task::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn insert(&self, task: Task) -> Result<Task, StoreError> {
        run_blocking(&self.pool, move |conn| {
            diesel::insert_into(tasks::table)
                .values(&task)
                .returning(Task::as_returning())
                .get_result(conn)
        })
        .await
    }

    async fn update_zone(
        &self,
        organization_id: Uuid,
        id: Uuid,
        zone: Zone,
    ) -> Result<Option<Task>, StoreError> {
        run_blocking(&self.pool, move |conn| {
            diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id))
                    .filter(tasks::organization_id.eq(organization_id)),
            )
            .set((tasks::zone.eq(zone), tasks::updated_at.eq(Utc::now())))
            .returning(Task::as_returning())
            .get_result(conn)
            .optional()
        })
        .await
    }

    async fn update_department(
        &self,
        organization_id: Uuid,
        id: Uuid,
        department: Department,
    ) -> Result<Option<Task>, StoreError> {
        run_blocking(&self.pool, move |conn| {
            diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id))
                    .filter(tasks::organization_id.eq(organization_id)),
            )
            .set((
                tasks::department.eq(department),
                tasks::updated_at.eq(Utc::now()),
            ))
            .returning(Task::as_returning())
            .get_result(conn)
            .optional()
        })
        .await
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        run_blocking(&self.pool, move |conn| {
            diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id))
                    .filter(tasks::organization_id.eq(organization_id)),
            )
            .execute(conn)
            .map(|deleted| deleted > 0)
        })
        .await
    }

    async fn count_by_zone(&self, organization_id: Uuid) -> Result<Vec<(Zone, i64)>, StoreError> {
        run_blocking(&self.pool, move |conn| {
            tasks::table
                .filter(tasks::organization_id.eq(organization_id))
                .group_by(tasks::zone)
                .select((tasks::zone, diesel::dsl::count_star()))
                .load::<(Zone, i64)>(conn)
        })
        .await
    }

    async fn employee_exists(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool, StoreError> {
        run_blocking(&self.pool, move |conn| {
            diesel::select(diesel::dsl::exists(
                employees::table
                    .filter(employees::id.eq(employee_id))
                    .filter(employees::organization_id.eq(organization_id)),
            ))
            .get_result::<bool>(conn)
        })
        .await
    }
}

/// Map-backed store; counts every call so tests can assert the store was left alone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    employees: Arc<RwLock<HashSet<(Uuid, Uuid)>>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Registers an employee id as belonging to `organization_id`.
    pub async fn add_employee(&self, organization_id: Uuid, employee_id: Uuid) {
        self.employees
            .write()
            .await
            .insert((organization_id, employee_id));
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn modify<F>(&self, organization_id: Uuid, id: Uuid, f: F) -> Option<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .filter(|t| t.organization_id == organization_id)?;
        f(task);
        task.updated_at = Utc::now();
        Some(task.clone())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_by_department(
        &self,
        organization_id: Uuid,
        department: Department,
    ) -> Result<Vec<Task>, StoreError> {
        self.touch();
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| t.organization_id == organization_id && t.department == department)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.touch();
        let tasks = self.tasks.read().await;
        Ok(tasks
            .get(&id)
            .filter(|t| t.organization_id == organization_id)
            .cloned())
    }

    async fn insert(&self, task: Task) -> Result<Task, StoreError> {
        self.touch();
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_zone(
        &self,
        organization_id: Uuid,
        id: Uuid,
        zone: Zone,
    ) -> Result<Option<Task>, StoreError> {
        self.touch();
        Ok(self.modify(organization_id, id, |t| t.zone = zone).await)
    }

    async fn update_department(
        &self,
        organization_id: Uuid,
        id: Uuid,
        department: Department,
    ) -> Result<Option<Task>, StoreError> {
        self.touch();
        Ok(self
            .modify(organization_id, id, |t| t.department = department)
            .await)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.touch();
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(t) if t.organization_id == organization_id => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_by_zone(&self, organization_id: Uuid) -> Result<Vec<(Zone, i64)>, StoreError> {
        self.touch();
        let tasks = self.tasks.read().await;
        let mut counts: HashMap<Zone, i64> = HashMap::new();
        for task in tasks.values().filter(|t| t.organization_id == organization_id) {
            *counts.entry(task.zone).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn employee_exists(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.touch();
        Ok(self
            .employees
            .read()
            .await
            .contains(&(organization_id, employee_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::TaskPriority;

    fn task(org: Uuid, department: Department, zone: Zone) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            organization_id: org,
            title: "Prepare quote".into(),
            description: None,
            department,
            zone,
            priority: TaskPriority::High,
            assignee_id: None,
            due_date: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_is_tenant_scoped() {
        let store = InMemoryTaskStore::new();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();
        let t = store
            .insert(task(org_a, Department::Sales, Zone::Shelf))
            .await
            .unwrap();

        assert!(store.get(org_b, t.id).await.unwrap().is_none());
        assert!(store.update_zone(org_b, t.id, Zone::Dock).await.unwrap().is_none());
        assert!(!store.delete(org_b, t.id).await.unwrap());
        assert!(store
            .list_by_department(org_b, Department::Sales)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.get(org_a, t.id).await.unwrap().unwrap().zone, Zone::Shelf);
    }

    #[tokio::test]
    async fn test_in_memory_update_bumps_timestamp() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let t = store
            .insert(task(org, Department::Design, Zone::Storage))
            .await
            .unwrap();

        let moved = store.update_zone(org, t.id, Zone::Active).await.unwrap().unwrap();
        assert_eq!(moved.zone, Zone::Active);
        assert!(moved.updated_at >= t.updated_at);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_count_by_zone() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        for zone in [Zone::Dock, Zone::Dock, Zone::Active] {
            store.insert(task(org, Department::Sales, zone)).await.unwrap();
        }
        let counts: HashMap<Zone, i64> = store.count_by_zone(org).await.unwrap().into_iter().collect();
        assert_eq!(counts.get(&Zone::Dock), Some(&2));
        assert_eq!(counts.get(&Zone::Active), Some(&1));
        assert_eq!(counts.get(&Zone::Shelf), None);
    }
}
