use aws_sdk_s3::primitives::ByteStream;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::response::{ApiCreated, ApiResponse};
use crate::core::shared::state::AppState;
use crate::security::auth::AuthenticatedUser;

use super::{drive_client, object_key};

#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub key: String,
    pub filename: String,
    pub size: usize,
    pub content_type: String,
}

struct IncomingFile {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/files/upload with a `file` part and an optional `folder` part.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiCreated<UploadedFile> {
    let client = drive_client(&state)?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let max_bytes = state.config.drive.max_upload_bytes;

    let mut folder: Option<String> = None;
    let mut incoming: Option<IncomingFile> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "folder" => folder = Some(field.text().await?),
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|f| !f.trim().is_empty())
                    .ok_or_else(|| ApiError::invalid_field("file", "File name is missing"))?;
                let content_type = field.content_type().map(str::to_string);

                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if data.len() + chunk.len() > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File exceeds the {max_bytes} byte upload limit"
                        )));
                    }
                    data.extend_from_slice(&chunk);
                }

                incoming = Some(IncomingFile {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let file = incoming.ok_or_else(|| ApiError::invalid_field("file", "No file provided"))?;
    if file.data.is_empty() {
        return Err(ApiError::invalid_field("file", "File is empty"));
    }

    let content_type = file.content_type.unwrap_or_else(|| {
        mime_guess::from_path(&file.filename)
            .first_or_octet_stream()
            .to_string()
    });
    let key = object_key(user.organization_id, folder.as_deref(), &file.filename);
    let size = file.data.len();

    client
        .put_object()
        .bucket(&state.config.drive.bucket)
        .key(&key)
        .body(ByteStream::from(file.data))
        .content_type(&content_type)
        .send()
        .await
        .map_err(|e| {
            error!("Failed to upload {}: {:?}", key, e);
            ApiError::Storage(e.to_string())
        })?;

    info!("Uploaded {} ({} bytes)", key, size);
    Ok(ApiResponse::created(UploadedFile {
        key,
        filename: file.filename,
        size,
        content_type,
    }))
}
