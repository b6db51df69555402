mod common;

#[cfg(test)]
mod dashboard_integration_tests {
    use super::common::TestApp;
    use axum::http::StatusCode;
    use hubserver::core::shared::enums::OpportunityStage;
    use hubserver::dashboards::EntityCounts;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_won_and_lost_opportunity_stats() {
        let app = TestApp::new();
        let org = Uuid::new_v4();
        app.dashboard
            .add_opportunity(org, OpportunityStage::Won, 1000.0)
            .await;
        app.dashboard
            .add_opportunity(org, OpportunityStage::Lost, 500.0)
            .await;

        let auth = app.bearer(Uuid::new_v4(), org);
        let (status, body) = app.get("/api/dashboard/opportunities", &auth).await;

        assert_eq!(status, StatusCode::OK);
        let stats = &body["data"];
        assert_eq!(stats["total_opportunities"], 2);
        assert_eq!(stats["won_opportunities"], 1);
        assert_eq!(stats["lost_opportunities"], 1);
        assert_eq!(stats["open_opportunities"], 0);
        assert_eq!(stats["conversion_rate"], 50.0);
        assert_eq!(stats["total_revenue"], 1000.0);
        assert_eq!(stats["pipeline_value"], 0.0);
        assert_eq!(stats["pipeline"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_stats_are_scoped_to_the_caller() {
        let app = TestApp::new();
        let org = Uuid::new_v4();
        app.dashboard
            .add_opportunity(org, OpportunityStage::Proposal, 2500.0)
            .await;

        let outsider = app.bearer(Uuid::new_v4(), Uuid::new_v4());
        let (_, body) = app.get("/api/dashboard/opportunities", &outsider).await;
        assert_eq!(body["data"]["total_opportunities"], 0);
        assert_eq!(body["data"]["conversion_rate"], 0.0);

        let member = app.bearer(Uuid::new_v4(), org);
        let (_, body) = app.get("/api/dashboard/opportunities", &member).await;
        assert_eq!(body["data"]["open_opportunities"], 1);
        assert_eq!(body["data"]["pipeline_value"], 2500.0);
    }

    #[tokio::test]
    async fn test_summary_combines_counts_tasks_and_pipeline() {
        let app = TestApp::new();
        let org = Uuid::new_v4();
        let auth = app.bearer(Uuid::new_v4(), org);

        app.dashboard
            .set_counts(
                org,
                EntityCounts {
                    companies: 3,
                    contacts: 7,
                    active_employees: 4,
                },
            )
            .await;
        app.dashboard
            .add_opportunity(org, OpportunityStage::Negotiation, 800.0)
            .await;
        app.dashboard
            .add_opportunity(org, OpportunityStage::Won, 200.0)
            .await;

        for zone in ["SHELF", "ACTIVE", "ACTIVE"] {
            let (status, _) = app
                .post(
                    "/api/operations/tasks",
                    &auth,
                    serde_json::json!({"title": "Task", "department": "SALES", "zone": zone}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = app.get("/api/dashboard/summary", &auth).await;
        assert_eq!(status, StatusCode::OK);
        let summary = &body["data"];
        assert_eq!(summary["companies"], 3);
        assert_eq!(summary["contacts"], 7);
        assert_eq!(summary["active_employees"], 4);
        assert_eq!(summary["open_opportunities"], 1);
        assert_eq!(summary["tasks_by_zone"]["SHELF"], 1);
        assert_eq!(summary["tasks_by_zone"]["ACTIVE"], 2);
        assert_eq!(summary["tasks_by_zone"]["DOCK"], 0);
        assert_eq!(summary["opportunities"]["conversion_rate"], 50.0);
    }

    #[tokio::test]
    async fn test_token_without_organization_uses_nil_tenant() {
        let app = TestApp::new();
        app.dashboard
            .add_opportunity(Uuid::nil(), OpportunityStage::Won, 10.0)
            .await;

        let token = app
            .state
            .jwt
            .issue_access_token(Uuid::new_v4(), None)
            .unwrap();
        let (status, body) = app
            .get("/api/dashboard/opportunities", &format!("Bearer {token}"))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["won_opportunities"], 1);
    }

    #[tokio::test]
    async fn test_dashboard_requires_session() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/dashboard/summary", "Bearer ").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }
}
