//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::{FileRecord, FileType, Folder, UploadProgress};
use crate::hierarchy::{DeleteSummary, FolderHierarchy, HierarchyNode, PageInfo, Totals};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    FolderEnvelope = ApiResponse<FolderResponse>,
    FileEnvelope = ApiResponse<FileResponse>,
    DeleteFolderEnvelope = ApiResponse<DeleteFolderResponse>,
    DeleteFileEnvelope = ApiResponse<DeleteFileResponse>,
    UploadProgressEnvelope = ApiResponse<UploadProgress>
)]
pub struct ApiResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Roots matching the filters.
    pub total: u64,
    /// Current page number.
    pub page: u32,
    /// Roots per page.
    pub limit: u32,
    /// Number of pages.
    pub total_pages: u64,
}

impl From<PageInfo> for PaginationMeta {
    fn from(info: PageInfo) -> Self {
        Self {
            total: info.total,
            page: info.page,
            limit: info.limit,
            total_pages: info.total_pages,
        }
    }
}

/// System-wide totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct CountsMeta {
    /// All folders.
    pub total_folders: i64,
    /// All files.
    pub total_files: i64,
}

impl From<Totals> for CountsMeta {
    fn from(totals: Totals) -> Self {
        Self {
            total_folders: totals.total_folders,
            total_files: totals.total_files,
        }
    }
}

/// Hierarchy page response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HierarchyResponse {
    /// Always true.
    pub success: bool,
    /// Root trees on this page.
    pub data: Vec<HierarchyNode>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
    /// System-wide totals.
    pub counts: CountsMeta,
}

impl From<FolderHierarchy> for HierarchyResponse {
    fn from(hierarchy: FolderHierarchy) -> Self {
        Self {
            success: true,
            data: hierarchy.data,
            pagination: hierarchy.pagination.into(),
            counts: hierarchy.counts.into(),
        }
    }
}

// ============================================================================
// Folder DTOs
// ============================================================================

/// Folder response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Parent folder ID.
    pub parent_id: Option<i64>,
    /// Ancestor ids including the folder itself.
    pub hierarchy_path: Vec<i64>,
    /// Depth, 0 for root folders.
    pub hierarchy_level: i64,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            hierarchy_path: folder.hierarchy_path.ids().to_vec(),
            name: folder.name,
            description: folder.description,
            parent_id: folder.parent_id,
            hierarchy_level: folder.hierarchy_level,
            created_at: to_rfc3339(&folder.created_at),
            updated_at: to_rfc3339(&folder.updated_at),
        }
    }
}

/// Folder delete response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteFolderResponse {
    /// Folders removed, including the folder itself.
    pub deleted_folders: u64,
    /// Files removed with them.
    pub deleted_files: u64,
}

impl From<DeleteSummary> for DeleteFolderResponse {
    fn from(summary: DeleteSummary) -> Self {
        Self {
            deleted_folders: summary.deleted_folders,
            deleted_files: summary.deleted_files,
        }
    }
}

// ============================================================================
// File DTOs
// ============================================================================

/// File response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Original file name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// File type.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: i64,
    /// Containing folder.
    pub folder_id: Option<i64>,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            id: file.id,
            name: file.name,
            description: file.description,
            file_type: file.file_type,
            size: file.size,
            folder_id: file.folder_id,
            created_at: to_rfc3339(&file.created_at),
            updated_at: to_rfc3339(&file.updated_at),
        }
    }
}

/// File delete response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteFileResponse {
    /// Always 1.
    pub deleted_files: u64,
}
