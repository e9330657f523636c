//! Nesting roots and descendants into trees.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::FileType;

use super::counts::AggregateCounts;
use super::expand::Descendants;
use super::item::{NodeKind, TreeItem};
use super::path::HierarchyPath;
use super::query::SortSpec;

/// A folder or file with its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HierarchyNode {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub description: Option<String>,
    /// Containing folder, `null` at the root level.
    pub parent_id: Option<i64>,
    /// Ancestor ids including the folder itself (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub hierarchy_path: Option<HierarchyPath>,
    /// Depth, 0 for root folders (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<i64>,
    /// Direct subfolders (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subfolder_count: Option<i64>,
    /// Direct files (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<i64>,
    /// Extension (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    /// Payload size in bytes (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn leaf(item: TreeItem, counts: &AggregateCounts) -> Self {
        match item {
            TreeItem::Folder(f) => Self {
                id: f.id,
                kind: NodeKind::Folder,
                subfolder_count: Some(counts.subfolder_count(f.id)),
                file_count: Some(counts.file_count(f.id)),
                name: f.name,
                description: f.description,
                parent_id: f.parent_id,
                hierarchy_level: Some(f.hierarchy_level),
                hierarchy_path: Some(f.hierarchy_path),
                file_type: None,
                size: None,
                created_at: to_rfc3339(&f.created_at),
                updated_at: to_rfc3339(&f.updated_at),
                children: Vec::new(),
            },
            TreeItem::File(f) => Self {
                id: f.id,
                kind: NodeKind::File,
                name: f.name,
                description: f.description,
                parent_id: f.folder_id,
                hierarchy_path: None,
                hierarchy_level: None,
                subfolder_count: None,
                file_count: None,
                file_type: Some(f.file_type),
                size: Some(f.size),
                created_at: to_rfc3339(&f.created_at),
                updated_at: to_rfc3339(&f.updated_at),
                children: Vec::new(),
            },
        }
    }
}

/// Build one tree per root, keeping the root order.
///
/// Children of every folder are ordered by `sort`; equal keys keep folders
/// (in traversal order) ahead of files (in id order).
pub fn assemble(
    roots: Vec<TreeItem>,
    descendants: Descendants,
    counts: &AggregateCounts,
    sort: &SortSpec,
) -> Vec<HierarchyNode> {
    let mut by_parent: HashMap<i64, Vec<TreeItem>> = HashMap::new();
    let items = descendants
        .folders
        .into_iter()
        .map(TreeItem::Folder)
        .chain(descendants.files.into_iter().map(TreeItem::File));
    for item in items {
        if let Some(parent_id) = item.parent_id() {
            by_parent.entry(parent_id).or_default().push(item);
        }
    }
    for siblings in by_parent.values_mut() {
        sort.sort(siblings);
    }

    roots
        .into_iter()
        .map(|root| build(root, &mut by_parent, counts))
        .collect()
}

/// Attach children recursively. Each child list is taken out of the map, so
/// no folder's children can be attached twice.
fn build(
    item: TreeItem,
    by_parent: &mut HashMap<i64, Vec<TreeItem>>,
    counts: &AggregateCounts,
) -> HierarchyNode {
    let children = match item {
        TreeItem::Folder(ref f) => by_parent.remove(&f.id).unwrap_or_default(),
        TreeItem::File(_) => Vec::new(),
    };

    let mut node = HierarchyNode::leaf(item, counts);
    node.children = children
        .into_iter()
        .map(|child| build(child, by_parent, counts))
        .collect();
    node
}
