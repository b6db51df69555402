#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use hubserver::core::config::AppConfig;
use hubserver::core::shared::state::AppState;
use hubserver::core::shared::utils::create_lazy_conn;
use hubserver::dashboards::InMemoryDashboardStore;
use hubserver::main_module::build_router;
use hubserver::security::jwt::{JwtConfig, JwtManager};
use hubserver::tasks::InMemoryTaskStore;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-secret-for-hub-tests-0123456789";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub tasks: InMemoryTaskStore,
    pub dashboard: InMemoryDashboardStore,
}

pub fn test_config(database_url: &str) -> AppConfig {
    let database_url = database_url.to_string();
    AppConfig::from_lookup(move |key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .unwrap_or_else(|e| panic!("test config: {e}"))
}

pub fn jwt_for(config: &AppConfig) -> JwtManager {
    JwtManager::new(
        JwtConfig {
            issuer: config.auth.issuer.clone(),
            audience: config.auth.audience.clone(),
            ..Default::default()
        },
        &config.auth.jwt_secret,
    )
    .unwrap_or_else(|e| panic!("test jwt: {e}"))
}

impl TestApp {
    /// Full router over in-memory stores and a pool that is never checked out.
    pub fn new() -> Self {
        let config = test_config("postgres://hub@127.0.0.1:1/hub_test");
        let jwt = jwt_for(&config);
        let conn = create_lazy_conn(&config.database.url);
        let tasks = InMemoryTaskStore::new();
        let dashboard = InMemoryDashboardStore::new();

        let state = Arc::new(
            AppState::new(config, conn, jwt)
                .with_task_store(Arc::new(tasks.clone()))
                .with_dashboard_store(Arc::new(dashboard.clone())),
        );

        Self {
            router: build_router(state.clone()),
            state,
            tasks,
            dashboard,
        }
    }

    pub fn bearer(&self, user_id: Uuid, organization_id: Uuid) -> String {
        let token = self
            .state
            .jwt
            .issue_access_token(user_id, Some(organization_id))
            .unwrap_or_else(|e| panic!("test token: {e}"));
        format!("Bearer {token}")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        send(self.router.clone(), request).await
    }

    pub async fn get(&self, uri: &str, auth: &str) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post(
        &self,
        uri: &str,
        auth: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send(json_request("POST", uri, Some(auth), body)).await
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
