//! Grove - folder and file hierarchy service
//!
//! A REST backend that stores folders and files in a tree and serves
//! paginated, filtered views of that tree with each root's complete subtree.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod hierarchy;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{ErrorKind, GroveError, Result};
pub use file::{FileRecord, FileService, FileStorage, FileType, Folder, FolderUpdate, NewFolder};
pub use hierarchy::{FolderHierarchy, FolderService, HierarchyNode, HierarchyQuery};
