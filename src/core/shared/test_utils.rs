//! Application state wired to in-memory stores and a pool that never connects.

use crate::core::config::AppConfig;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::create_lazy_conn;
use crate::dashboards::storage::InMemoryDashboardStore;
use crate::security::jwt::JwtManager;
use crate::tasks::store::InMemoryTaskStore;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-for-hub-unit-tests-0123456789";

pub struct TestAppState {
    pub state: Arc<AppState>,
    pub tasks: InMemoryTaskStore,
    pub dashboard: InMemoryDashboardStore,
}

impl TestAppState {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config<F>(customize: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://hub@127.0.0.1:1/hub_test".to_string()),
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            _ => None,
        })
        .unwrap_or_else(|e| panic!("test config: {e}"));
        customize(&mut config);

        let jwt = JwtManager::new(
            crate::security::jwt::JwtConfig {
                issuer: config.auth.issuer.clone(),
                audience: config.auth.audience.clone(),
                ..Default::default()
            },
            &config.auth.jwt_secret,
        )
        .unwrap_or_else(|e| panic!("test jwt: {e}"));

        let conn = create_lazy_conn(&config.database.url);
        let tasks = InMemoryTaskStore::new();
        let dashboard = InMemoryDashboardStore::new();

        let state = AppState::new(config, conn, jwt)
            .with_task_store(Arc::new(tasks.clone()))
            .with_dashboard_store(Arc::new(dashboard.clone()));

        Self {
            state: Arc::new(state),
            tasks,
            dashboard,
        }
    }

    /// Rebuilds the state before any router has cloned it.
    pub fn map_state<F>(self, f: F) -> Self
    where
        F: FnOnce(AppState) -> AppState,
    {
        let state = Arc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("state is already shared"));
        Self {
            state: Arc::new(f(state)),
            tasks: self.tasks,
            dashboard: self.dashboard,
        }
    }

    pub fn token(&self, user_id: Uuid, organization_id: Uuid) -> String {
        self.state
            .jwt
            .issue_access_token(user_id, Some(organization_id))
            .unwrap_or_else(|e| panic!("test token: {e}"))
    }

    pub fn bearer(&self, user_id: Uuid, organization_id: Uuid) -> String {
        format!("Bearer {}", self.token(user_id, organization_id))
    }
}

impl Default for TestAppState {
    fn default() -> Self {
        Self::new()
    }
}
