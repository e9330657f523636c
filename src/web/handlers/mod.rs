//! API handlers for the Grove HTTP API.

use std::sync::Arc;

use crate::config::Config;
use crate::file::{FileService, FileStorage, UploadTracker, DEFAULT_MAX_FILE_SIZE};
use crate::hierarchy::{FolderService, DEFAULT_MAX_DEPTH};
use crate::Database;

pub mod file;
pub mod folder;

pub use file::*;
pub use folder::*;

/// Database handle shared across requests.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
pub struct AppState {
    /// Database connection pool.
    pub db: SharedDatabase,
    /// Storage for uploaded payloads.
    pub file_storage: FileStorage,
    /// Progress of in-flight uploads.
    pub uploads: UploadTracker,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Bound on descendant traversal depth.
    pub max_depth: u32,
}

impl AppState {
    /// Create a new application state with default limits.
    pub fn new(db: SharedDatabase, file_storage: FileStorage) -> Self {
        Self {
            db,
            file_storage,
            uploads: UploadTracker::new(),
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create the application state from configuration.
    pub fn from_config(db: SharedDatabase, config: &Config) -> crate::Result<Self> {
        let file_storage = FileStorage::new(&config.files.storage_path)?;
        Ok(Self::new(db, file_storage)
            .with_max_upload_size(config.files.max_upload_size_bytes())
            .with_max_depth(config.hierarchy.max_depth))
    }

    /// Set the maximum upload size.
    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// Set the descendant traversal depth bound.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Folder service bound to this state.
    pub fn folder_service(&self) -> FolderService<'_> {
        FolderService::new(&self.db).with_max_depth(self.max_depth)
    }

    /// File service bound to this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.file_storage).with_max_file_size(self.max_upload_size)
    }
}
