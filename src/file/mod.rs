//! File management module for Grove.
//!
//! This module provides:
//! - Folder and file metadata persistence
//! - Payload storage with UUID naming
//! - Upload progress tracking

mod folder;
mod metadata;
mod service;
mod storage;
mod types;
mod upload;

pub use folder::{Folder, FolderRepository, FolderUpdate, NewFolder, SubtreeRemoval};
pub use metadata::{FileRecord, FileRepository, NewFile};
pub use service::{FileService, UploadRequest};
pub use storage::FileStorage;
pub use types::FileType;
pub use upload::{UploadGuard, UploadProgress, UploadStatus, UploadTracker};

/// Maximum length for folder names (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for folder/file descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
