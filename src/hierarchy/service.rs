//! Folder service: the operations exposed to the HTTP layer.

use crate::db::Database;
use crate::file::{FileRepository, Folder, FolderRepository, FolderUpdate, NewFolder};
use crate::{GroveError, Result};

use super::assemble::{assemble, HierarchyNode};
use super::counts::AggregateCounts;
use super::expand::load_descendants;
use super::item::TreeItem;
use super::query::HierarchyQuery;
use super::select::{select_roots, total_pages};

/// Default bound on descendant traversal depth.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Pagination metadata of a hierarchy page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Roots matching the filters, across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// System-wide totals, independent of filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_folders: i64,
    pub total_files: i64,
}

/// A materialized hierarchy page.
#[derive(Debug, Clone)]
pub struct FolderHierarchy {
    pub data: Vec<HierarchyNode>,
    pub pagination: PageInfo,
    pub counts: Totals,
}

/// Result of a folder delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Folders removed, including the deleted folder itself.
    pub deleted_folders: u64,
    /// Files removed from the deleted subtree.
    pub deleted_files: u64,
    /// Stored payload names of the removed files.
    pub file_paths: Vec<String>,
}

/// Folder service.
pub struct FolderService<'a> {
    db: &'a Database,
    max_depth: u32,
}

impl<'a> FolderService<'a> {
    /// Create a new FolderService.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the descendant traversal depth bound.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn folders(&self) -> FolderRepository<'a> {
        FolderRepository::new(self.db.pool())
    }

    fn files(&self) -> FileRepository<'a> {
        FileRepository::new(self.db.pool())
    }

    /// Create a folder.
    ///
    /// Fails with `ParentNotFound` if the parent does not exist and with
    /// `DuplicateName` if a sibling already uses the name.
    pub async fn create_folder(&self, new_folder: &NewFolder) -> Result<Folder> {
        let repo = self.folders();

        let parent = match new_folder.parent_id {
            Some(parent_id) => Some(
                repo.get_by_id(parent_id)
                    .await?
                    .ok_or(GroveError::ParentNotFound(parent_id))?,
            ),
            None => None,
        };

        if repo
            .find_sibling(new_folder.parent_id, &new_folder.name)
            .await?
            .is_some()
        {
            return Err(GroveError::DuplicateName(new_folder.name.clone()));
        }

        let folder = repo.create(new_folder, parent.as_ref()).await?;
        tracing::info!(
            "Created folder {} '{}' at {}",
            folder.id,
            folder.name,
            folder.hierarchy_path
        );
        Ok(folder)
    }

    /// Materialize one page of the folder hierarchy.
    ///
    /// Filters and pagination apply to root-level items only; every selected
    /// root folder comes back with its complete subtree.
    pub async fn get_hierarchy(&self, query: &HierarchyQuery) -> Result<FolderHierarchy> {
        let folder_repo = self.folders();
        let file_repo = self.files();

        let root_folders = folder_repo.list_roots(&query.filter).await?;
        let root_files = file_repo.list_roots(&query.filter).await?;
        let page = select_roots(root_folders, root_files, query);

        let selected: Vec<&Folder> = page
            .items
            .iter()
            .filter_map(|item| match item {
                TreeItem::Folder(f) => Some(f),
                TreeItem::File(_) => None,
            })
            .collect();
        let descendants =
            load_descendants(&folder_repo, &file_repo, &selected, self.max_depth).await?;

        let counts = AggregateCounts::load(&folder_repo, &file_repo).await?;
        let totals = Totals {
            total_folders: folder_repo.count_all().await?,
            total_files: file_repo.count_all().await?,
        };

        let data = assemble(page.items, descendants, &counts, &query.sort);

        Ok(FolderHierarchy {
            data,
            pagination: PageInfo {
                total: page.total,
                page: query.page,
                limit: query.limit,
                total_pages: total_pages(page.total, query.limit),
            },
            counts: totals,
        })
    }

    /// Update a folder's name, description or parent.
    ///
    /// Checks run in order: folder exists, new parent exists, the move does
    /// not place the folder below itself, the name is free in the destination.
    pub async fn update_folder(&self, id: i64, update: &FolderUpdate) -> Result<Folder> {
        let repo = self.folders();
        let current = repo
            .get_by_id(id)
            .await?
            .ok_or(GroveError::FolderNotFound(id))?;

        let destination = match update.parent_id {
            Some(Some(parent_id)) => {
                let parent = repo
                    .get_by_id(parent_id)
                    .await?
                    .ok_or(GroveError::ParentNotFound(parent_id))?;
                if current.hierarchy_path.contains(&parent.hierarchy_path) {
                    return Err(GroveError::CyclicMove {
                        folder_id: id,
                        target_id: parent_id,
                    });
                }
                Some(parent_id)
            }
            Some(None) => None,
            None => current.parent_id,
        };

        let name = update.name.as_deref().unwrap_or(&current.name);
        if let Some(existing) = repo.find_sibling(destination, name).await? {
            if existing.id != id {
                return Err(GroveError::DuplicateName(name.to_string()));
            }
        }

        let folder = repo
            .update(id, update)
            .await?
            .ok_or(GroveError::FolderNotFound(id))?;

        if folder.parent_id != current.parent_id {
            tracing::info!(
                "Moved folder {} from {} to {}",
                id,
                current.hierarchy_path,
                folder.hierarchy_path
            );
        }
        Ok(folder)
    }

    /// Delete a folder, its subtree and every contained file.
    pub async fn delete_folder(&self, id: i64) -> Result<DeleteSummary> {
        let repo = self.folders();
        let folder = repo
            .get_by_id(id)
            .await?
            .ok_or(GroveError::FolderNotFound(id))?;

        let removal = repo.delete_subtree(&folder).await?;
        if removal.folders == 0 {
            return Err(GroveError::FolderNotFound(id));
        }

        tracing::info!(
            "Deleted folder {} with {} folders and {} files",
            id,
            removal.folders,
            removal.files
        );

        Ok(DeleteSummary {
            deleted_folders: removal.folders,
            deleted_files: removal.files,
            file_paths: removal.file_paths,
        })
    }
}
