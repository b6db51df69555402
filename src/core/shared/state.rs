use crate::core::config::AppConfig;
use crate::core::shared::utils::DbPool;
use crate::dashboards::storage::{DashboardStore, PgDashboardStore};
use crate::security::jwt::JwtManager;
use crate::tasks::store::{PgTaskStore, TaskStore};
#[cfg(feature = "drive")]
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

pub struct AppState {
    pub config: AppConfig,
    pub conn: DbPool,
    #[cfg(feature = "drive")]
    pub drive: Option<S3Client>,
    pub jwt: Arc<JwtManager>,
    pub task_store: Arc<dyn TaskStore>,
    pub dashboard_store: Arc<dyn DashboardStore>,
}

impl AppState {
    /// State backed by PostgreSQL for every store.
    pub fn new(config: AppConfig, conn: DbPool, jwt: JwtManager) -> Self {
        Self {
            task_store: Arc::new(PgTaskStore::new(conn.clone())),
            dashboard_store: Arc::new(PgDashboardStore::new(conn.clone())),
            config,
            conn,
            #[cfg(feature = "drive")]
            drive: None,
            jwt: Arc::new(jwt),
        }
    }

    #[cfg(feature = "drive")]
    pub fn with_drive(mut self, drive: Option<S3Client>) -> Self {
        self.drive = drive;
        self
    }

    pub fn with_task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = store;
        self
    }

    pub fn with_dashboard_store(mut self, store: Arc<dyn DashboardStore>) -> Self {
        self.dashboard_store = store;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("AppState");

        #[cfg(feature = "drive")]
        debug.field("drive", &self.drive.is_some());

        debug
            .field("config", &self.config)
            .field("conn", &"DbPool")
            .field("jwt", &self.jwt)
            .field("task_store", &"Arc<dyn TaskStore>")
            .field("dashboard_store", &"Arc<dyn DashboardStore>")
            .finish()
    }
}
