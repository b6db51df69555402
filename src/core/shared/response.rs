use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::shared::error::ApiError;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: uuid::Uuid,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: uuid::Uuid) -> Self {
        Self { id, deleted: true }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// `Json<T>` whose rejection is reported in the error envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// `Query<T>` whose rejection is reported in the error envelope.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        zone: String,
    }

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_body_accepts_valid_payload() {
        let JsonBody(payload) = JsonBody::<Payload>::from_request(request(r#"{"zone":"DOCK"}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.zone, "DOCK");
    }

    #[tokio::test]
    async fn test_json_body_rejection_is_validation_error() {
        let err = JsonBody::<Payload>::from_request(request(r#"{"zone": 5}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation(ref d) if d[0].field == "body"));
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        limit: Option<i64>,
    }

    async fn query(uri: &str) -> Result<QueryParams<Paging>, ApiError> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts();
        QueryParams::<Paging>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_query_params_accepts_valid_query() {
        let QueryParams(paging) = query("/?limit=5").await.unwrap();
        assert_eq!(paging.limit, Some(5));
    }

    #[tokio::test]
    async fn test_query_params_rejection_is_validation_error() {
        let err = query("/?limit=abc").await.err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation(ref d) if d[0].field == "query"));
    }

    #[test]
    fn test_envelope_shape() {
        let Json(body) = ApiResponse::ok(vec![1, 2]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
