//! Folder types and repository for Grove.

use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

use crate::error::is_unique_violation;
use crate::hierarchy::path::{compute_path, HierarchyPath};
use crate::hierarchy::query::RootFilter;
use crate::{GroveError, Result};

const FOLDER_COLUMNS: &str =
    "id, name, description, parent_id, hierarchy_path, hierarchy_level, created_at, updated_at";

/// A folder in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name, unique among siblings.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
    /// Ancestor ids from the root down to this folder.
    #[sqlx(try_from = "String")]
    pub hierarchy_path: HierarchyPath,
    /// Depth, 0 for root folders.
    pub hierarchy_level: i64,
    /// When the folder was created.
    pub created_at: String,
    /// When the folder was last modified.
    pub updated_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
}

impl NewFolder {
    /// Create a new root-level NewFolder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parent_id: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Builder for updating a folder.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    /// New folder name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New parent folder ID; `Some(None)` moves the folder to the root level.
    pub parent_id: Option<Option<i64>>,
}

impl FolderUpdate {
    /// Create a new FolderUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = Some(description.map(|s| s.into()));
        self
    }

    /// Set the parent folder ID.
    pub fn parent_id(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.parent_id.is_none()
    }
}

/// Rows removed by a subtree delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtreeRemoval {
    /// Number of folders removed, including the subtree root.
    pub folders: u64,
    /// Number of files removed.
    pub files: u64,
    /// Stored payload names of the removed files.
    pub file_paths: Vec<String>,
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder under `parent` (or at the root level).
    ///
    /// The row and its hierarchy path are written in one transaction.
    pub async fn create(&self, folder: &NewFolder, parent: Option<&Folder>) -> Result<Folder> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO folders (name, description, parent_id) VALUES (?, ?, ?)")
            .bind(&folder.name)
            .bind(&folder.description)
            .bind(parent.map(|p| p.id))
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, &folder.name))?;

        let id = result.last_insert_rowid();
        let (path, level) = compute_path(parent.map(|p| &p.hierarchy_path), id);

        sqlx::query("UPDATE folders SET hierarchy_path = ?, hierarchy_level = ? WHERE id = ?")
            .bind(path.encode())
            .bind(level)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or(GroveError::FolderNotFound(id))
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// Find a folder by exact name among the children of `parent_id`.
    pub async fn find_sibling(&self, parent_id: Option<i64>, name: &str) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id IS ? AND name = ?"
        ))
        .bind(parent_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List root folders matching `filter`, in id order.
    pub async fn list_roots(&self, filter: &RootFilter) -> Result<Vec<Folder>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id IS NULL"
        ));
        filter.push_conditions(&mut query);
        query.push(" ORDER BY id");

        let folders = query
            .build_query_as::<Folder>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// List every strict descendant of the given folders, down to
    /// `max_level`, ordered by level then id.
    pub async fn list_descendants(
        &self,
        roots: &[&HierarchyPath],
        max_level: i64,
    ) -> Result<Vec<Folder>> {
        if roots.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE hierarchy_level <= "
        ));
        query.push_bind(max_level);
        query.push(" AND (");
        let mut separated = query.separated(" OR ");
        for root in roots {
            separated.push("hierarchy_path LIKE ");
            separated.push_bind_unseparated(root.descendant_pattern());
        }
        query.push(") ORDER BY hierarchy_level, id");

        let folders = query
            .build_query_as::<Folder>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Update a folder.
    ///
    /// When the parent changes, the paths and levels of the folder and its
    /// whole subtree are rewritten in the same transaction. Returns `None` if
    /// the folder does not exist.
    pub async fn update(&self, id: i64, update: &FolderUpdate) -> Result<Option<Folder>> {
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(current));
        }

        let mut tx = self.pool.begin().await?;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE folders SET ");
        let mut separated = query.separated(", ");
        separated.push("updated_at = datetime('now')");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        if let Some(parent_id) = update.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let name = update.name.as_deref().unwrap_or(&current.name);
        query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, name))?;

        if let Some(new_parent_id) = update.parent_id {
            if new_parent_id != current.parent_id {
                let parent_path = match new_parent_id {
                    Some(parent_id) => Some(Self::path_in_tx(&mut tx, parent_id).await?),
                    None => None,
                };
                if let Some(ref parent_path) = parent_path {
                    if current.hierarchy_path.contains(parent_path) {
                        return Err(GroveError::CyclicMove {
                            folder_id: id,
                            target_id: parent_path.leaf().unwrap_or(id),
                        });
                    }
                }
                let (new_base, _) = compute_path(parent_path.as_ref(), id);
                Self::rebase_subtree(&mut tx, &current.hierarchy_path, &new_base).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        self.get_by_id(id).await
    }

    async fn path_in_tx(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<HierarchyPath> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT hierarchy_path FROM folders WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| GroveError::Database(e.to_string()))?;

        match row {
            Some((raw,)) => HierarchyPath::decode(&raw),
            None => Err(GroveError::ParentNotFound(id)),
        }
    }

    /// Rewrite the path and level of every folder inside `old_base`.
    async fn rebase_subtree(
        tx: &mut Transaction<'_, Sqlite>,
        old_base: &HierarchyPath,
        new_base: &HierarchyPath,
    ) -> Result<()> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, hierarchy_path FROM folders WHERE hierarchy_path LIKE ?")
                .bind(old_base.subtree_pattern())
                .fetch_all(&mut **tx)
                .await
                .map_err(|e| GroveError::Database(e.to_string()))?;

        for (id, raw) in rows {
            let Some(path) = HierarchyPath::decode(&raw)?.rebase(old_base, new_base) else {
                continue;
            };
            sqlx::query("UPDATE folders SET hierarchy_path = ?, hierarchy_level = ? WHERE id = ?")
                .bind(path.encode())
                .bind(path.level())
                .bind(id)
                .execute(&mut **tx)
                .await
                .map_err(|e| GroveError::Database(e.to_string()))?;
        }

        tracing::debug!("Rebased subtree {} onto {}", old_base, new_base);
        Ok(())
    }

    /// Delete a folder together with its subtree and every contained file.
    pub async fn delete_subtree(&self, folder: &Folder) -> Result<SubtreeRemoval> {
        let pattern = folder.hierarchy_path.subtree_pattern();
        let mut tx = self.pool.begin().await?;

        let file_paths: Vec<(String,)> = sqlx::query_as(
            "SELECT file_path FROM files
             WHERE folder_id IN (SELECT id FROM folders WHERE hierarchy_path LIKE ?)",
        )
        .bind(&pattern)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        let files = sqlx::query(
            "DELETE FROM files
             WHERE folder_id IN (SELECT id FROM folders WHERE hierarchy_path LIKE ?)",
        )
        .bind(&pattern)
        .execute(&mut *tx)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?
        .rows_affected();

        // Cascaded child rows are not part of rows_affected()
        let (folders,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM folders WHERE hierarchy_path LIKE ?")
                .bind(&pattern)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| GroveError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM folders WHERE hierarchy_path LIKE ?")
            .bind(&pattern)
            .execute(&mut *tx)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(SubtreeRemoval {
            folders: folders as u64,
            files,
            file_paths: file_paths.into_iter().map(|(p,)| p).collect(),
        })
    }

    /// Count all folders.
    pub async fn count_all(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM folders")
            .fetch_one(self.pool)
            .await
            .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Number of direct subfolders, grouped by parent ID.
    pub async fn count_by_parent(&self) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT parent_id, COUNT(*) FROM folders WHERE parent_id IS NOT NULL GROUP BY parent_id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| GroveError::Database(e.to_string()))?;

        Ok(rows)
    }
}

fn write_error(e: sqlx::Error, name: &str) -> GroveError {
    if is_unique_violation(&e) {
        GroveError::DuplicateName(name.to_string())
    } else {
        GroveError::Database(e.to_string())
    }
}
