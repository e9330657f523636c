//! File metadata types and repository for Grove.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::hierarchy::query::RootFilter;
use crate::{GroveError, Result};

use super::types::FileType;

const FILE_COLUMNS: &str =
    "id, name, description, file_type, file_path, size, folder_id, created_at, updated_at";

/// Folder ids bound per `IN (...)` query.
const ID_CHUNK_SIZE: usize = 500;

/// Metadata of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Original file name.
    pub name: String,
    /// File description.
    pub description: Option<String>,
    /// File type.
    #[sqlx(try_from = "String")]
    pub file_type: FileType,
    /// Stored payload name inside the upload directory.
    pub file_path: String,
    /// Payload size in bytes.
    pub size: i64,
    /// Containing folder (None for root-level files).
    pub folder_id: Option<i64>,
    /// When the file was uploaded.
    pub created_at: String,
    /// When the metadata was last modified.
    pub updated_at: String,
}

/// Data for creating a new file entry.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Original file name.
    pub name: String,
    /// File description.
    pub description: Option<String>,
    /// File type.
    pub file_type: FileType,
    /// Stored payload name.
    pub file_path: String,
    /// Payload size in bytes.
    pub size: i64,
    /// Containing folder.
    pub folder_id: Option<i64>,
}

impl NewFile {
    /// Create a new root-level NewFile.
    pub fn new(
        name: impl Into<String>,
        file_type: FileType,
        file_path: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            file_type,
            file_path: file_path.into(),
            size,
            folder_id: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Place the file in a folder.
    pub fn with_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }
}

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file entry.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (name, description, file_type, file_path, size, folder_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.name)
        .bind(&file.description)
        .bind(file.file_type.as_str())
        .bind(&file.file_path)
        .bind(file.size)
        .bind(file.folder_id)
        .execute(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or(GroveError::FileNotFound(id))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(file)
    }

    /// List root-level files matching `filter`, in id order.
    pub async fn list_roots(&self, filter: &RootFilter) -> Result<Vec<FileRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE folder_id IS NULL"
        ));
        filter.push_conditions(&mut query);
        query.push(" ORDER BY id");

        let files = query
            .build_query_as::<FileRecord>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(files)
    }

    /// List the files contained directly in any of the given folders, in id
    /// order.
    pub async fn list_by_folders(&self, folder_ids: &[i64]) -> Result<Vec<FileRecord>> {
        let mut files = Vec::new();

        for chunk in folder_ids.chunks(ID_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "SELECT {FILE_COLUMNS} FROM files WHERE folder_id IN ("
            ));
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            query.push(")");

            let mut rows = query
                .build_query_as::<FileRecord>()
                .fetch_all(self.pool)
                .await
                .map_err(|e| GroveError::Database(e.to_string()))?;
            files.append(&mut rows);
        }

        files.sort_by_key(|f| f.id);
        Ok(files)
    }

    /// Delete a file entry by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all files.
    pub async fn count_all(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Number of files, grouped by containing folder.
    pub async fn count_by_folder(&self) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT folder_id, COUNT(*) FROM files WHERE folder_id IS NOT NULL GROUP BY folder_id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(rows)
    }
}
