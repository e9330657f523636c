//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    CountsMeta, CreateFolderRequest, DeleteFileEnvelope, DeleteFileResponse, DeleteFolderEnvelope,
    DeleteFolderResponse, FileEnvelope, FileResponse, FolderEnvelope, FolderResponse,
    HierarchyResponse, PaginationMeta, UpdateFolderRequest, UploadForm, UploadProgressEnvelope,
};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{
    self, create_folder, delete_file, delete_folder, get_folder_hierarchy, get_upload_progress,
    update_folder, upload_file, AppState,
};
use super::middleware::create_cors_layer;
use crate::file::{FileType, UploadProgress, UploadStatus};
use crate::hierarchy::{HierarchyNode, NodeKind};

/// Room for multipart framing and the text fields on top of the payload.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(title = "Grove API", description = "Folder and file hierarchy service"),
    servers((url = "/api")),
    paths(
        handlers::folder::create_folder,
        handlers::folder::get_folder_hierarchy,
        handlers::folder::update_folder,
        handlers::folder::delete_folder,
        handlers::file::upload_file,
        handlers::file::get_upload_progress,
        handlers::file::delete_file,
    ),
    components(schemas(
        CreateFolderRequest,
        UpdateFolderRequest,
        UploadForm,
        FolderResponse,
        FileResponse,
        HierarchyResponse,
        HierarchyNode,
        NodeKind,
        FileType,
        PaginationMeta,
        CountsMeta,
        DeleteFolderResponse,
        DeleteFileResponse,
        UploadProgress,
        UploadStatus,
        FolderEnvelope,
        FileEnvelope,
        DeleteFolderEnvelope,
        DeleteFileEnvelope,
        UploadProgressEnvelope,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "folders", description = "Folder hierarchy"),
        (name = "files", description = "File upload and removal")
    )
)]
pub struct ApiDoc;

/// Create the main application router.
///
/// Serves the API under `/api` together with the health check and the
/// OpenAPI documentation.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_limit =
        usize::try_from(app_state.max_upload_size).unwrap_or(usize::MAX - MULTIPART_OVERHEAD);
    let upload_limit = upload_limit.saturating_add(MULTIPART_OVERHEAD);

    let folder_routes = Router::new()
        .route("/folders", get(get_folder_hierarchy))
        .route("/folders/create", post(create_folder))
        .route("/folders/update/:id", put(update_folder))
        .route("/folders/:id", delete(delete_folder));

    let file_routes = Router::new()
        .route(
            "/files/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/files/progress/:upload_id", get(get_upload_progress))
        .route("/files/:id", delete(delete_file));

    let api_routes = Router::new().merge(folder_routes).merge(file_routes);

    Router::new()
        .nest("/api", api_routes)
        .with_state(app_state)
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(CompressionLayer::new()),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
