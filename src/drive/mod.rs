//! Object storage: tenant-scoped uploads and presigned URLs.
//!
//! Every object key starts with the caller's organization id, so a tenant can
//! only upload below, or presign, its own prefix.

#[cfg(feature = "drive")]
pub mod presign;
#[cfg(feature = "drive")]
pub mod upload;

use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::MAX_PRESIGN_EXPIRY_SECS;
use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::sanitize_path_component;

pub const DEFAULT_FOLDER: &str = "uploads";

/// Room for multipart boundaries and the small text parts next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[cfg(feature = "drive")]
pub fn configure_drive_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    use axum::routing::{get, post};

    Router::new()
        .route(
            "/api/files/upload",
            post(upload::upload_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/api/files/presigned", get(presign::presigned_download))
        .route("/api/files/presigned-upload", post(presign::presigned_upload))
}

#[cfg(not(feature = "drive"))]
pub fn configure_drive_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    use axum::routing::{get, post};

    Router::new()
        .route(
            "/api/files/upload",
            post(drive_unavailable)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/api/files/presigned", get(drive_unavailable))
        .route("/api/files/presigned-upload", post(drive_unavailable))
}

#[cfg(not(feature = "drive"))]
async fn drive_unavailable(_user: crate::security::auth::AuthenticatedUser) -> ApiError {
    ApiError::Unavailable("File storage is not enabled in this build".into())
}

#[cfg(feature = "drive")]
pub(crate) fn drive_client(state: &AppState) -> Result<&aws_sdk_s3::Client, ApiError> {
    state
        .drive
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("File storage is not configured".into()))
}

pub fn tenant_prefix(organization_id: Uuid) -> String {
    format!("{organization_id}/")
}

/// Cleans a client folder path segment by segment. Empty input means the default folder.
pub fn normalize_folder(folder: Option<&str>) -> String {
    let segments: Vec<String> = folder
        .unwrap_or_default()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(sanitize_path_component)
        .collect();

    if segments.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        segments.join("/")
    }
}

/// `<tenant>/<folder>/<uuid>-<filename>`
pub fn object_key(organization_id: Uuid, folder: Option<&str>, filename: &str) -> String {
    format!(
        "{}{}/{}-{}",
        tenant_prefix(organization_id),
        normalize_folder(folder),
        Uuid::new_v4(),
        sanitize_path_component(filename)
    )
}

/// Accepts a key only when it lies below the caller's prefix. Anything else is reported
/// as missing so foreign keys are indistinguishable from absent ones.
pub fn ensure_tenant_key(organization_id: Uuid, key: &str) -> Result<String, ApiError> {
    let key = key.trim().trim_start_matches('/');
    let prefix = tenant_prefix(organization_id);

    let escapes = key.split('/').any(|segment| segment == "..");
    if key.len() <= prefix.len() || !key.starts_with(&prefix) || escapes {
        return Err(ApiError::NotFound("File not found".into()));
    }
    Ok(key.to_string())
}

pub fn bounded_expiry(requested: Option<u64>, default_secs: u64) -> Result<Duration, ApiError> {
    let secs = requested.unwrap_or(default_secs);
    if !(1..=MAX_PRESIGN_EXPIRY_SECS).contains(&secs) {
        return Err(ApiError::invalid_field(
            "expires_in",
            format!("Field 'expires_in' must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let org = Uuid::new_v4();
        let key = object_key(org, Some("invoices/2025"), "March report.pdf");

        assert!(key.starts_with(&format!("{org}/invoices/2025/")));
        assert!(key.ends_with("-March_report.pdf"));
        assert!(ensure_tenant_key(org, &key).is_ok());
    }

    #[test]
    fn test_folder_normalization() {
        assert_eq!(normalize_folder(None), "uploads");
        assert_eq!(normalize_folder(Some("  ")), "uploads");
        assert_eq!(normalize_folder(Some("../../etc")), "etc");
        assert_eq!(normalize_folder(Some("/a//b c/")), "a/b_c");
    }

    #[test]
    fn test_foreign_keys_are_not_found() {
        let org = Uuid::new_v4();
        let other = Uuid::new_v4();
        let foreign = format!("{other}/uploads/x.pdf");

        assert!(matches!(
            ensure_tenant_key(org, &foreign),
            Err(ApiError::NotFound(_))
        ));
        assert!(ensure_tenant_key(org, &format!("{org}/../{other}/x.pdf")).is_err());
        assert!(ensure_tenant_key(org, &format!("{org}/")).is_err());
        assert!(ensure_tenant_key(org, &format!("/{org}/uploads/x.pdf")).is_ok());
    }

    #[test]
    fn test_expiry_bounds() {
        assert_eq!(bounded_expiry(None, 3600).unwrap(), Duration::from_secs(3600));
        assert_eq!(bounded_expiry(Some(60), 3600).unwrap(), Duration::from_secs(60));
        assert!(bounded_expiry(Some(0), 3600).is_err());
        assert!(bounded_expiry(Some(604_801), 3600).is_err());
        assert!(bounded_expiry(Some(604_800), 3600).is_ok());
    }
}
