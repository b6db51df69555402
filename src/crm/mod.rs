pub mod companies;
pub mod contacts;
pub mod opportunities;
pub mod types;

use axum::{routing::get, Router};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::{companies as companies_table, contacts as contacts_table};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

pub use types::{Company, Contact, Opportunity};

pub fn configure_crm_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/crm/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/api/crm/companies/:id",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
        .route(
            "/api/crm/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/api/crm/contacts/:id",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route(
            "/api/crm/opportunities",
            get(opportunities::list_opportunities).post(opportunities::create_opportunity),
        )
        .route(
            "/api/crm/opportunities/:id",
            get(opportunities::get_opportunity)
                .put(opportunities::update_opportunity)
                .delete(opportunities::delete_opportunity),
        )
}

/// A referenced company must belong to the caller's tenant.
pub(crate) async fn ensure_company_in_tenant(
    state: &AppState,
    organization_id: Uuid,
    company_id: Uuid,
) -> Result<(), ApiError> {
    let found = run_blocking(&state.conn, move |conn| {
        diesel::select(diesel::dsl::exists(
            companies_table::table
                .filter(companies_table::id.eq(company_id))
                .filter(companies_table::organization_id.eq(organization_id)),
        ))
        .get_result::<bool>(conn)
    })
    .await?;

    if found {
        Ok(())
    } else {
        Err(ApiError::invalid_field(
            "company_id",
            format!("Company {company_id} does not exist"),
        ))
    }
}

pub(crate) async fn ensure_contact_in_tenant(
    state: &AppState,
    organization_id: Uuid,
    contact_id: Uuid,
) -> Result<(), ApiError> {
    let found = run_blocking(&state.conn, move |conn| {
        diesel::select(diesel::dsl::exists(
            contacts_table::table
                .filter(contacts_table::id.eq(contact_id))
                .filter(contacts_table::organization_id.eq(organization_id)),
        ))
        .get_result::<bool>(conn)
    })
    .await?;

    if found {
        Ok(())
    } else {
        Err(ApiError::invalid_field(
            "contact_id",
            format!("Contact {contact_id} does not exist"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::TestAppState;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(test: &TestAppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = configure_crm_routes().with_state(test.state.clone());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    fn post(uri: &str, auth: Option<String>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_crm_requires_session() {
        let test = TestAppState::new();
        for uri in ["/api/crm/companies", "/api/crm/contacts", "/api/crm/opportunities"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, body) = send(&test, request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let test = TestAppState::new();
        let request = Request::builder()
            .uri("/api/crm/companies")
            .header(header::AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&test, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_company_validation_details() {
        let test = TestAppState::new();
        let auth = test.bearer(Uuid::new_v4(), Uuid::new_v4());
        let (status, body) = send(
            &test,
            post(
                "/api/crm/companies",
                Some(auth),
                serde_json::json!({"name": "", "email": "nope"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "name");
        assert_eq!(body["details"][1]["field"], "email");
    }

    #[tokio::test]
    async fn test_create_opportunity_rejects_unknown_stage() {
        let test = TestAppState::new();
        let auth = test.bearer(Uuid::new_v4(), Uuid::new_v4());
        let (status, body) = send(
            &test,
            post(
                "/api/crm/opportunities",
                Some(auth),
                serde_json::json!({"name": "Deal", "stage": "MAYBE"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "stage");
    }

    #[tokio::test]
    async fn test_missing_required_field_is_400() {
        let test = TestAppState::new();
        let auth = test.bearer(Uuid::new_v4(), Uuid::new_v4());
        let (status, body) = send(
            &test,
            post("/api/crm/contacts", Some(auth), serde_json::json!({"first_name": "Ada"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["details"].is_array());
    }

    #[tokio::test]
    async fn test_bad_id_is_400() {
        let test = TestAppState::new();
        let auth = test.bearer(Uuid::new_v4(), Uuid::new_v4());
        let request = Request::builder()
            .uri("/api/crm/companies/not-a-uuid")
            .header(header::AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&test, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "id");
    }
}
