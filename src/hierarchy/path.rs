//! Materialized ancestor paths.
//!
//! Every folder stores the ids of its ancestors, root first and itself last.
//! On disk the path is encoded as `/1/4/9/`; the enclosing separators make a
//! plain string prefix test equivalent to an ancestry test.

use std::fmt;

use serde::Serialize;

use crate::{GroveError, Result};

const SEPARATOR: char = '/';

/// Ordered ancestor ids from the root down to the folder itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HierarchyPath(Vec<i64>);

impl HierarchyPath {
    /// Path of a root folder.
    pub fn root(id: i64) -> Self {
        Self(vec![id])
    }

    /// Path of a direct child of this folder.
    pub fn child(&self, id: i64) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    /// Ancestor ids, root first, including the folder itself.
    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    /// Id of the folder this path belongs to.
    pub fn leaf(&self) -> Option<i64> {
        self.0.last().copied()
    }

    /// Depth of the folder: 0 for roots.
    pub fn level(&self) -> i64 {
        self.0.len() as i64 - 1
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &HierarchyPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Whether `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &HierarchyPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Encode for storage, e.g. `/1/4/9/`.
    pub fn encode(&self) -> String {
        let mut out = String::from(SEPARATOR);
        for id in &self.0 {
            out.push_str(&id.to_string());
            out.push(SEPARATOR);
        }
        out
    }

    /// `LIKE` pattern matching every strict descendant of this folder.
    pub fn descendant_pattern(&self) -> String {
        format!("{}_%", self.encode())
    }

    /// `LIKE` pattern matching this folder and all of its descendants.
    pub fn subtree_pattern(&self) -> String {
        format!("{}%", self.encode())
    }

    /// Decode a stored path.
    pub fn decode(raw: &str) -> Result<Self> {
        let inner = raw
            .strip_prefix(SEPARATOR)
            .and_then(|s| s.strip_suffix(SEPARATOR))
            .ok_or_else(|| GroveError::Database(format!("malformed hierarchy path '{raw}'")))?;

        let ids = inner
            .split(SEPARATOR)
            .map(|part| {
                part.parse::<i64>().map_err(|_| {
                    GroveError::Database(format!("malformed hierarchy path '{raw}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if ids.is_empty() {
            return Err(GroveError::Database(format!(
                "malformed hierarchy path '{raw}'"
            )));
        }

        Ok(Self(ids))
    }

    /// Re-root this path after the subtree at `old_base` moved to `new_base`.
    ///
    /// Returns `None` if `self` is not inside `old_base`.
    pub fn rebase(&self, old_base: &HierarchyPath, new_base: &HierarchyPath) -> Option<Self> {
        if !old_base.contains(self) {
            return None;
        }
        let mut ids = new_base.0.clone();
        ids.extend_from_slice(&self.0[old_base.0.len()..]);
        Some(Self(ids))
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl TryFrom<String> for HierarchyPath {
    type Error = GroveError;

    fn try_from(value: String) -> Result<Self> {
        Self::decode(&value)
    }
}

/// Compute the path and level of folder `id` placed under `parent`.
///
/// `parent` is the parent's current path, or `None` for a root folder.
pub fn compute_path(parent: Option<&HierarchyPath>, id: i64) -> (HierarchyPath, i64) {
    let path = match parent {
        Some(parent) => parent.child(id),
        None => HierarchyPath::root(id),
    };
    let level = path.level();
    (path, level)
}
