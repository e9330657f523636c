//! Folder hierarchy retrieval and maintenance.
//!
//! A hierarchy request flows through the pipeline:
//! 1. [`query`] validates filters, sorting and pagination
//! 2. [`select`] picks the page of root-level folders and files
//! 3. [`expand`] collects every descendant of the selected root folders
//! 4. [`counts`] supplies direct subfolder/file counts
//! 5. [`assemble`] nests everything into ordered trees
//!
//! [`path`] maintains the materialized ancestor paths the expansion relies
//! on, and [`service`] exposes the create/read/update/delete operations.

pub mod assemble;
pub mod counts;
pub mod expand;
pub mod item;
pub mod path;
pub mod query;
pub mod select;
pub mod service;

pub use assemble::HierarchyNode;
pub use counts::AggregateCounts;
pub use item::{NodeKind, TreeItem};
pub use path::{compute_path, HierarchyPath};
pub use query::{HierarchyParams, HierarchyQuery, RootFilter, SortBy, SortOrder, SortSpec};
pub use service::{
    DeleteSummary, FolderHierarchy, FolderService, PageInfo, Totals, DEFAULT_MAX_DEPTH,
};
