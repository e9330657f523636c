//! Folder handlers for Web API.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::hierarchy::HierarchyQuery;
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, DeleteFolderResponse, FolderResponse, HierarchyQueryParams,
    HierarchyResponse, UpdateFolderRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/folders/create - Create a folder.
#[utoipa::path(
    post,
    path = "/folders/create",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderEnvelope),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Parent folder not found", body = ErrorBody),
        (status = 409, description = "Folder name already used in this location", body = ErrorBody)
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = state
        .folder_service()
        .create_folder(&req.into_new_folder())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders - Get the folder hierarchy.
///
/// Filters, sorting and pagination apply to root-level folders and files.
/// Each selected root folder is returned with its complete subtree.
#[utoipa::path(
    get,
    path = "/folders",
    tag = "folders",
    params(HierarchyQueryParams),
    responses(
        (status = 200, description = "Hierarchy page", body = HierarchyResponse),
        (status = 400, description = "Invalid pagination, sort or filter", body = ErrorBody)
    )
)]
pub async fn get_folder_hierarchy(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HierarchyQueryParams>, QueryRejection>,
) -> Result<Json<HierarchyResponse>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = HierarchyQuery::parse(&params.into_params()?)?;

    let hierarchy = state.folder_service().get_hierarchy(&query).await?;
    Ok(Json(HierarchyResponse::from(hierarchy)))
}

/// PUT /api/folders/update/:id - Update a folder.
///
/// Changing `parent_id` moves the folder together with its subtree.
#[utoipa::path(
    put,
    path = "/folders/update/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = FolderEnvelope),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Folder or parent folder not found", body = ErrorBody),
        (status = 409, description = "Name conflict or move below itself", body = ErrorBody)
    )
)]
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let update = req.into_update()?;
    let folder = state.folder_service().update_folder(id, &update).await?;

    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// DELETE /api/folders/:id - Delete a folder with its subtree and files.
#[utoipa::path(
    delete,
    path = "/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder deleted", body = DeleteFolderEnvelope),
        (status = 404, description = "Folder not found", body = ErrorBody)
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteFolderResponse>>, ApiError> {
    let summary = state.folder_service().delete_folder(id).await?;

    let removed = state.file_storage.delete_all(&summary.file_paths).await;
    if removed < summary.file_paths.len() {
        tracing::warn!(
            "Removed {} of {} stored payloads for folder {}",
            removed,
            summary.file_paths.len(),
            id
        );
    }

    Ok(Json(ApiResponse::new(DeleteFolderResponse::from(summary))))
}
