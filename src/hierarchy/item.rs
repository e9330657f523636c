//! Folders and files handled uniformly by the hierarchy pipeline.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{FileRecord, Folder};

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// A folder or a file.
#[derive(Debug, Clone)]
pub enum TreeItem {
    Folder(Folder),
    File(FileRecord),
}

impl TreeItem {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeItem::Folder(_) => NodeKind::Folder,
            TreeItem::File(_) => NodeKind::File,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            TreeItem::Folder(f) => f.id,
            TreeItem::File(f) => f.id,
        }
    }

    /// Containing folder, `None` at the root level.
    pub fn parent_id(&self) -> Option<i64> {
        match self {
            TreeItem::Folder(f) => f.parent_id,
            TreeItem::File(f) => f.folder_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeItem::Folder(f) => &f.name,
            TreeItem::File(f) => &f.name,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            TreeItem::Folder(f) => &f.created_at,
            TreeItem::File(f) => &f.created_at,
        }
    }

    pub fn updated_at(&self) -> &str {
        match self {
            TreeItem::Folder(f) => &f.updated_at,
            TreeItem::File(f) => &f.updated_at,
        }
    }
}
