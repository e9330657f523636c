//! File service for Grove.
//!
//! This module provides high-level file operations:
//! - Upload with folder, type and size checks
//! - Deletion of metadata together with the stored payload

use crate::db::Database;
use crate::{GroveError, Result};

use super::folder::FolderRepository;
use super::metadata::{FileRecord, FileRepository, NewFile};
use super::storage::FileStorage;
use super::types::FileType;
use super::DEFAULT_MAX_FILE_SIZE;

/// Metadata accompanying an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Original file name.
    pub filename: String,
    /// File description (optional).
    pub description: Option<String>,
    /// Declared type; derived from the file name when absent.
    pub file_type: Option<FileType>,
    /// Destination folder (None for the root level).
    pub folder_id: Option<i64>,
}

impl UploadRequest {
    /// Create a new root-level upload request.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the destination folder.
    pub fn with_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Declare the file type explicitly.
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }
}

/// File service for managing uploads and deletions.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Upload limit in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Fail with `UploadTooLarge` if `size` exceeds the limit.
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(GroveError::UploadTooLarge {
                max_mb: self.max_file_size / 1024 / 1024,
            });
        }
        Ok(())
    }

    /// Resolve the type of an upload.
    pub fn resolve_type(request: &UploadRequest) -> Result<FileType> {
        match request.file_type {
            Some(file_type) => Ok(file_type),
            None => FileType::from_filename(&request.filename),
        }
    }

    /// Fail with `FolderNotFound` unless the destination folder exists.
    pub async fn check_folder(&self, folder_id: Option<i64>) -> Result<()> {
        if let Some(folder_id) = folder_id {
            FolderRepository::new(self.db.pool())
                .get_by_id(folder_id)
                .await?
                .ok_or(GroveError::FolderNotFound(folder_id))?;
        }
        Ok(())
    }

    /// Upload a complete payload.
    pub async fn upload(&self, request: &UploadRequest, content: &[u8]) -> Result<FileRecord> {
        self.check_size(content.len() as u64)?;
        let file_type = Self::resolve_type(request)?;
        self.check_folder(request.folder_id).await?;

        let stored_name = self.storage.save(content, file_type).await?;
        self.register(request, file_type, stored_name, content.len() as u64)
            .await
    }

    /// Record metadata for a payload already written under `stored_name`.
    ///
    /// The payload is removed again if the metadata cannot be stored.
    pub async fn register(
        &self,
        request: &UploadRequest,
        file_type: FileType,
        stored_name: String,
        size: u64,
    ) -> Result<FileRecord> {
        let mut new_file = NewFile::new(&request.filename, file_type, &stored_name, size as i64);
        if let Some(folder_id) = request.folder_id {
            new_file = new_file.with_folder(folder_id);
        }
        if let Some(ref desc) = request.description {
            if !desc.trim().is_empty() {
                new_file = new_file.with_description(desc.trim());
            }
        }

        let result = match self.check_folder(request.folder_id).await {
            Ok(()) => FileRepository::new(self.db.pool()).create(&new_file).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(file) => {
                tracing::info!(
                    "Stored file {} ({}, {} bytes) as {}",
                    file.id,
                    file.file_type,
                    file.size,
                    file.file_path
                );
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored_name).await {
                    tracing::warn!("Failed to remove orphaned payload {}: {}", stored_name, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete a file and its stored payload.
    ///
    /// A payload that cannot be removed is logged, not reported.
    pub async fn delete_file(&self, id: i64) -> Result<FileRecord> {
        let repo = FileRepository::new(self.db.pool());
        let file = repo.get_by_id(id).await?.ok_or(GroveError::FileNotFound(id))?;

        if !repo.delete(id).await? {
            return Err(GroveError::FileNotFound(id));
        }

        self.storage.delete_all(std::slice::from_ref(&file.file_path)).await;
        Ok(file)
    }
}
