use aws_sdk_s3::presigning::PresigningConfig;
use axum::extract::State;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::shared::error::ApiError;
use crate::core::shared::response::{ApiResponse, ApiResult, JsonBody, QueryParams};
use crate::core::shared::state::AppState;
use crate::security::auth::AuthenticatedUser;
use crate::security::validation::Validator;

use super::{bounded_expiry, drive_client, ensure_tenant_key, object_key};

#[derive(Debug, Deserialize)]
pub struct PresignedDownloadQuery {
    pub key: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PresignedUploadRequest {
    pub filename: String,
    pub content_type: String,
    pub folder: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PresignedUrl {
    pub url: String,
    pub key: String,
    pub method: &'static str,
    pub expires_in: u64,
}

fn presigning_config(expires_in: Duration) -> Result<PresigningConfig, ApiError> {
    PresigningConfig::expires_in(expires_in).map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /api/files/presigned?key=...&expires_in=...
pub async fn presigned_download(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<PresignedDownloadQuery>,
) -> ApiResult<PresignedUrl> {
    let client = drive_client(&state)?;
    let key = ensure_tenant_key(user.organization_id, &query.key)?;
    let expires_in = bounded_expiry(query.expires_in, state.config.drive.presign_expiry_secs)?;

    let request = client
        .get_object()
        .bucket(&state.config.drive.bucket)
        .key(&key)
        .presigned(presigning_config(expires_in)?)
        .await
        .map_err(|e| {
            error!("Failed to presign download for {}: {:?}", key, e);
            ApiError::Storage(e.to_string())
        })?;

    debug!("Presigned download for {} ({}s)", key, expires_in.as_secs());
    Ok(ApiResponse::ok(PresignedUrl {
        url: request.uri().to_string(),
        key,
        method: "GET",
        expires_in: expires_in.as_secs(),
    }))
}

/// POST /api/files/presigned-upload
pub async fn presigned_upload(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<PresignedUploadRequest>,
) -> ApiResult<PresignedUrl> {
    let client = drive_client(&state)?;
    Validator::new()
        .string_required(&req.filename, "filename")
        .max_length(&req.filename, "filename", 255)
        .string_required(&req.content_type, "content_type")
        .validate()?;
    let expires_in = bounded_expiry(req.expires_in, state.config.drive.presign_expiry_secs)?;
    let key = object_key(user.organization_id, req.folder.as_deref(), &req.filename);

    let request = client
        .put_object()
        .bucket(&state.config.drive.bucket)
        .key(&key)
        .content_type(&req.content_type)
        .presigned(presigning_config(expires_in)?)
        .await
        .map_err(|e| {
            error!("Failed to presign upload for {}: {:?}", key, e);
            ApiError::Storage(e.to_string())
        })?;

    debug!("Presigned upload for {} ({}s)", key, expires_in.as_secs());
    Ok(ApiResponse::ok(PresignedUrl {
        url: request.uri().to_string(),
        key,
        method: "PUT",
        expires_in: expires_in.as_secs(),
    }))
}
