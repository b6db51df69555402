//! Zone board queries and mutations.
//!
//! Transitions are unrestricted: a task may move from any zone to any other,
//! including the zone it is already in (which only refreshes `updated_at`).

use chrono::Utc;
use log::{error, info};
use uuid::Uuid;

use crate::core::shared::enums::{Department, TaskPriority, Zone};
use crate::core::shared::error::ApiError;
use crate::tasks::store::TaskStore;
use crate::tasks::types::{CreateTaskRequest, Task, TaskZoneBoard};
use crate::security::validation::parse_enum;

pub async fn get_tasks_by_department(
    store: &dyn TaskStore,
    organization_id: Uuid,
    department: Department,
) -> Result<TaskZoneBoard, ApiError> {
    let tasks = store
        .list_by_department(organization_id, department)
        .await
        .map_err(|e| {
            error!("Failed to load {} board: {}", department, e);
            ApiError::Database(format!("failed to load tasks: {e}"))
        })?;

    Ok(TaskZoneBoard::from_tasks(department, tasks))
}

/// Moves a task to `zone`. An absent acting user is rejected before the store is consulted.
pub async fn move_task_to_zone(
    store: &dyn TaskStore,
    organization_id: Uuid,
    task_id: Uuid,
    zone: Zone,
    user_id: Option<Uuid>,
) -> Result<Task, ApiError> {
    let Some(user_id) = user_id else {
        return Err(ApiError::Unauthorized("Authentication required".into()));
    };

    let task = store
        .update_zone(organization_id, task_id, zone)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    info!("Task {} moved to {} by {}", task_id, zone, user_id);
    Ok(task)
}

pub async fn assign_task_to_department(
    store: &dyn TaskStore,
    organization_id: Uuid,
    task_id: Uuid,
    department: Department,
) -> Result<Task, ApiError> {
    let task = store
        .update_department(organization_id, task_id, department)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    info!("Task {} assigned to {}", task_id, department);
    Ok(task)
}

pub async fn create_task(
    store: &dyn TaskStore,
    organization_id: Uuid,
    created_by: Uuid,
    request: CreateTaskRequest,
) -> Result<Task, ApiError> {
    request.validator().validate()?;

    let department: Department = parse_enum(&request.department, "department")?;
    let zone = match request.zone.as_deref() {
        Some(raw) => parse_enum::<Zone>(raw, "zone")?,
        None => Zone::default(),
    };
    let priority = match request.priority.as_deref() {
        Some(raw) => parse_enum::<TaskPriority>(raw, "priority")?,
        None => TaskPriority::default(),
    };
    if let Some(assignee_id) = request.assignee_id {
        ensure_employee_in_tenant(store, organization_id, assignee_id).await?;
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        organization_id,
        title: request.title.trim().to_string(),
        description: request.description,
        department,
        zone,
        priority,
        assignee_id: request.assignee_id,
        due_date: request.due_date,
        created_by: Some(created_by),
        created_at: now,
        updated_at: now,
    };

    let task = store.insert(task).await?;
    info!("Created task {} in {}/{}", task.id, department, zone);
    Ok(task)
}

async fn ensure_employee_in_tenant(
    store: &dyn TaskStore,
    organization_id: Uuid,
    employee_id: Uuid,
) -> Result<(), ApiError> {
    if store.employee_exists(organization_id, employee_id).await? {
        Ok(())
    } else {
        Err(ApiError::invalid_field(
            "assignee_id",
            format!("Employee {employee_id} does not exist"),
        ))
    }
}

pub async fn get_task(
    store: &dyn TaskStore,
    organization_id: Uuid,
    task_id: Uuid,
) -> Result<Task, ApiError> {
    store
        .get(organization_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))
}

pub async fn delete_task(
    store: &dyn TaskStore,
    organization_id: Uuid,
    task_id: Uuid,
) -> Result<(), ApiError> {
    if store.delete(organization_id, task_id).await? {
        info!("Deleted task {}", task_id);
        Ok(())
    } else {
        Err(ApiError::NotFound("Task not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::store::InMemoryTaskStore;

    fn request(title: &str, department: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.into(),
            description: None,
            department: department.into(),
            zone: None,
            priority: None,
            assignee_id: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let task = create_task(&store, org, Uuid::new_v4(), request(" Call supplier ", "ops"))
            .await
            .unwrap();

        assert_eq!(task.title, "Call supplier");
        assert_eq!(task.department, Department::Operations);
        assert_eq!(task.zone, Zone::Shelf);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn test_create_task_rejects_unknown_zone() {
        let store = InMemoryTaskStore::new();
        let mut req = request("Audit", "SALES");
        req.zone = Some("BASEMENT".into());

        let err = create_task(&store, Uuid::nil(), Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref d) if d[0].field == "zone"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_task_checks_assignee_tenant() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        store.add_employee(org, colleague).await;
        store.add_employee(Uuid::new_v4(), outsider).await;

        let mut req = request("Follow up", "SALES");
        req.assignee_id = Some(colleague);
        let task = create_task(&store, org, Uuid::new_v4(), req).await.unwrap();
        assert_eq!(task.assignee_id, Some(colleague));

        for assignee in [outsider, Uuid::new_v4()] {
            let mut req = request("Follow up", "SALES");
            req.assignee_id = Some(assignee);
            let err = create_task(&store, org, Uuid::new_v4(), req)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(ref d) if d[0].field == "assignee_id"));
        }

        let board = get_tasks_by_department(&store, org, Department::Sales)
            .await
            .unwrap();
        assert_eq!(board.total, 1);
    }

    #[tokio::test]
    async fn test_move_without_user_never_touches_store() {
        let store = InMemoryTaskStore::new();
        let err = move_task_to_zone(&store, Uuid::nil(), Uuid::new_v4(), Zone::Dock, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_move_any_zone_to_any_zone() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();
        let task = create_task(&store, org, user, request("Ship order", "SALES"))
            .await
            .unwrap();

        for zone in [Zone::Active, Zone::Shelf, Zone::Dock, Zone::Dock, Zone::Storage] {
            let moved = move_task_to_zone(&store, org, task.id, zone, Some(user))
                .await
                .unwrap();
            assert_eq!(moved.zone, zone);
        }
    }

    #[tokio::test]
    async fn test_move_unknown_task_is_not_found() {
        let store = InMemoryTaskStore::new();
        let err = move_task_to_zone(&store, Uuid::nil(), Uuid::new_v4(), Zone::Dock, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_assign_department_keeps_zone() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let mut req = request("Landing page", "MARKETING");
        req.zone = Some("DOCK".into());
        let task = create_task(&store, org, Uuid::new_v4(), req).await.unwrap();

        let moved = assign_task_to_department(&store, org, task.id, Department::Design)
            .await
            .unwrap();
        assert_eq!(moved.department, Department::Design);
        assert_eq!(moved.zone, Zone::Dock);

        let board = get_tasks_by_department(&store, org, Department::Marketing)
            .await
            .unwrap();
        assert_eq!(board.total, 0);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = InMemoryTaskStore::new();
        let org = Uuid::new_v4();
        let task = create_task(&store, org, Uuid::new_v4(), request("Old", "ADMIN"))
            .await
            .unwrap();

        delete_task(&store, org, task.id).await.unwrap();
        assert!(matches!(
            get_task(&store, org, task.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            delete_task(&store, org, task.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
