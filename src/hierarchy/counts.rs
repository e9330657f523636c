//! Per-folder aggregate counts.
//!
//! Counts are built from grouped queries on every request and never stored.

use std::collections::HashMap;

use crate::file::{FileRepository, FolderRepository};
use crate::Result;

/// Direct subfolder and file counts per folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCounts {
    subfolders: HashMap<i64, i64>,
    files: HashMap<i64, i64>,
}

impl AggregateCounts {
    /// Build from `(parent_id, count)` and `(folder_id, count)` groups.
    pub fn from_groups(
        subfolder_groups: impl IntoIterator<Item = (i64, i64)>,
        file_groups: impl IntoIterator<Item = (i64, i64)>,
    ) -> Self {
        Self {
            subfolders: subfolder_groups.into_iter().collect(),
            files: file_groups.into_iter().collect(),
        }
    }

    /// Run both grouped count queries.
    pub async fn load(folders: &FolderRepository<'_>, files: &FileRepository<'_>) -> Result<Self> {
        Ok(Self::from_groups(
            folders.count_by_parent().await?,
            files.count_by_folder().await?,
        ))
    }

    pub fn subfolder_count(&self, folder_id: i64) -> i64 {
        self.subfolders.get(&folder_id).copied().unwrap_or(0)
    }

    pub fn file_count(&self, folder_id: i64) -> i64 {
        self.files.get(&folder_id).copied().unwrap_or(0)
    }
}
