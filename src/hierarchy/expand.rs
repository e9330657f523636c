//! Descendant expansion below the selected root folders.
//!
//! Storage returns every folder whose path lies under one of the roots; the
//! traversal here walks parent links breadth-first from the roots and keeps
//! only nodes that the path index places under the root they were reached
//! from. A visited set and a depth bound make the walk terminate on any
//! input, including corrupted parent links.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::file::{FileRecord, FileRepository, Folder, FolderRepository};
use crate::Result;

/// Everything below a set of root folders.
#[derive(Debug, Clone, Default)]
pub struct Descendants {
    /// Descendant folders in breadth-first order.
    pub folders: Vec<Folder>,
    /// Files contained in the roots or in any descendant folder, in id order.
    pub files: Vec<FileRecord>,
}

/// Result of a breadth-first walk.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Reachable descendants in breadth-first order.
    pub folders: Vec<Folder>,
    /// Folders at the depth bound whose subfolders were left out.
    pub truncated: Vec<i64>,
}

/// Breadth-first walk from `roots` through `candidates`.
///
/// `candidates` are folders fetched by path prefix, including one level past
/// the bound so cut-off subtrees can be reported. Returns the reachable
/// descendants at most `max_depth` levels below their root.
pub fn expand_folders(roots: &[&Folder], candidates: Vec<Folder>, max_depth: u32) -> Expansion {
    let mut children: HashMap<i64, Vec<Folder>> = HashMap::new();
    for folder in candidates {
        if let Some(parent_id) = folder.parent_id {
            children.entry(parent_id).or_default().push(folder);
        }
    }

    let mut visited: HashSet<i64> = roots.iter().map(|r| r.id).collect();
    let mut queue: VecDeque<(i64, usize, u32)> = roots
        .iter()
        .enumerate()
        .map(|(root_index, root)| (root.id, root_index, 0))
        .collect();
    let mut found = Vec::new();
    let mut truncated = Vec::new();

    while let Some((folder_id, root_index, depth)) = queue.pop_front() {
        if depth >= max_depth {
            if children.contains_key(&folder_id) {
                tracing::warn!(
                    "Folder {} is {} levels below root {}; its subfolders are not expanded",
                    folder_id,
                    depth,
                    roots[root_index].id
                );
                truncated.push(folder_id);
            }
            continue;
        }
        let Some(kids) = children.remove(&folder_id) else {
            continue;
        };
        let root_path = &roots[root_index].hierarchy_path;

        for child in kids {
            if !root_path.is_ancestor_of(&child.hierarchy_path) {
                tracing::warn!(
                    "Folder {} (path {}) is linked below {} but its path is outside root {}; skipping",
                    child.id,
                    child.hierarchy_path,
                    folder_id,
                    root_path
                );
                continue;
            }
            if !visited.insert(child.id) {
                tracing::warn!("Folder {} reached twice; skipping", child.id);
                continue;
            }
            queue.push_back((child.id, root_index, depth + 1));
            found.push(child);
        }
    }

    Expansion {
        folders: found,
        truncated,
    }
}

/// Fetch and expand every descendant of `roots`.
pub async fn load_descendants(
    folders: &FolderRepository<'_>,
    files: &FileRepository<'_>,
    roots: &[&Folder],
    max_depth: u32,
) -> Result<Descendants> {
    if roots.is_empty() {
        return Ok(Descendants::default());
    }

    let paths: Vec<_> = roots.iter().map(|r| &r.hierarchy_path).collect();
    let candidates = folders
        .list_descendants(&paths, i64::from(max_depth) + 1)
        .await?;
    let expanded = expand_folders(roots, candidates, max_depth).folders;

    let folder_ids: Vec<i64> = roots
        .iter()
        .map(|r| r.id)
        .chain(expanded.iter().map(|f| f.id))
        .collect();
    let contained = files.list_by_folders(&folder_ids).await?;

    tracing::debug!(
        "Expanded {} roots into {} folders and {} files",
        roots.len(),
        expanded.len(),
        contained.len()
    );

    Ok(Descendants {
        folders: expanded,
        files: contained,
    })
}
