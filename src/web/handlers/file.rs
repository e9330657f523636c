//! File handlers for Web API.

use axum::{
    extract::{multipart::MultipartError, rejection::QueryRejection, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::file::{
    FileRecord, FileService, FileType, UploadGuard, UploadProgress, UploadRequest,
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use crate::web::dto::{
    validation::description_text, ApiResponse, DeleteFileResponse, FileResponse, UploadQuery,
};
use crate::web::error::{ApiError, ErrorCode};
use crate::web::handlers::AppState;
use crate::GroveError;

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and optional
/// "folder_id", "description" and "file_type" fields. Progress can be polled
/// under the `upload_id` query parameter while the body is received.
#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    params(UploadQuery),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded", body = FileEnvelope),
        (status = 400, description = "Invalid input or unsupported file type", body = ErrorBody),
        (status = 404, description = "Folder not found", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let upload_id = query.upload_id.unwrap_or_else(Uuid::new_v4);

    // Approximate: includes the multipart framing
    let total_bytes = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let guard = state.uploads.start(upload_id, total_bytes)?;

    match receive_upload(&state, &guard, multipart).await {
        Ok(file) => {
            guard.complete(file.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new(FileResponse::from(file))),
            ))
        }
        Err(e) => {
            guard.fail(e.message().to_string());
            Err(e)
        }
    }
}

/// Read the multipart body, store the payload and record its metadata.
async fn receive_upload(
    state: &AppState,
    guard: &UploadGuard,
    mut multipart: Multipart,
) -> Result<FileRecord, ApiError> {
    let service = state.file_service();

    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut request = UploadRequest::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&service, e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(base_name);
                let mut buffer = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(&service, e))?
                {
                    buffer.extend_from_slice(&chunk);
                    service.check_size(buffer.len() as u64)?;
                    guard.advance(buffer.len() as u64);
                }
                content = Some(buffer);
            }
            "folder_id" => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    let folder_id = text
                        .trim()
                        .parse::<i64>()
                        .ok()
                        .filter(|id| *id >= 1)
                        .ok_or_else(|| {
                            ApiError::new(
                                ErrorCode::ValidationError,
                                "folder_id must be a positive integer",
                            )
                        })?;
                    request.folder_id = Some(folder_id);
                }
            }
            "description" => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
                        return Err(ApiError::new(
                            ErrorCode::ValidationError,
                            "Description must be at most 1000 characters",
                        ));
                    }
                    description_text(&text).map_err(|_| {
                        ApiError::new(
                            ErrorCode::ValidationError,
                            "Description must not contain control characters",
                        )
                    })?;
                    request.description = Some(text.trim().to_string());
                }
            }
            "file_type" => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    request.file_type = Some(text.parse::<FileType>()?);
                }
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("File name is required"));
    }
    if filename.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::new(
            ErrorCode::ValidationError,
            "File name must be at most 255 characters",
        ));
    }
    request.filename = filename;

    let file = service.upload(&request, &content).await?;
    tracing::info!("Upload {} stored as file {}", guard.upload_id(), file.id);
    Ok(file)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or("").to_string();
    field.text().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field {}: {}", name, e);
        ApiError::bad_request(format!("Invalid {}", name))
    })
}

fn multipart_error(service: &FileService<'_>, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return GroveError::UploadTooLarge {
            max_mb: service.max_file_size() / 1024 / 1024,
        }
        .into();
    }
    tracing::warn!("Failed to read multipart data: {}", e);
    ApiError::bad_request("Invalid multipart data")
}

/// Strip any directory components a client sent with the file name.
fn base_name(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim()
        .to_string()
}

/// GET /api/files/progress/:upload_id - Get upload progress.
///
/// A completed or failed upload is forgotten once its state has been read.
#[utoipa::path(
    get,
    path = "/files/progress/{upload_id}",
    tag = "files",
    params(
        ("upload_id" = Uuid, Path, description = "Upload ID")
    ),
    responses(
        (status = 200, description = "Upload progress", body = UploadProgressEnvelope),
        (status = 404, description = "Unknown upload", body = ErrorBody)
    )
)]
pub async fn get_upload_progress(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UploadProgress>>, ApiError> {
    let progress = state
        .uploads
        .poll(&upload_id)
        .ok_or_else(|| ApiError::not_found("Upload not found"))?;

    Ok(Json(ApiResponse::new(progress)))
}

/// DELETE /api/files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileEnvelope),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteFileResponse>>, ApiError> {
    let file = state.file_service().delete_file(id).await?;
    tracing::info!("Deleted file {} '{}'", file.id, file.name);

    Ok(Json(ApiResponse::new(DeleteFileResponse { deleted_files: 1 })))
}
