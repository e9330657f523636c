//! Database schema and migrations for Grove.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The schema_version table
/// tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Folders with the materialized ancestor path
    r#"
-- hierarchy_path is '/<root id>/.../<own id>/' so that a LIKE prefix match
-- never confuses '/1/4/' with '/1/40/'
CREATE TABLE folders (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    description      TEXT,
    parent_id        INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    hierarchy_path   TEXT NOT NULL DEFAULT '',
    hierarchy_level  INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_parent_id ON folders(parent_id);
CREATE INDEX idx_folders_hierarchy_path ON folders(hierarchy_path);
CREATE UNIQUE INDEX idx_folders_sibling_name ON folders(COALESCE(parent_id, 0), name);
"#,
    // v2: Files stored in folders (or at the root level)
    r#"
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    description  TEXT,
    file_type    TEXT NOT NULL,           -- 'pdf', 'png', 'docx', 'jpg', 'svg', 'gif', 'txt'
    file_path    TEXT NOT NULL,           -- stored name inside the upload directory
    size         INTEGER NOT NULL DEFAULT 0,
    folder_id    INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
"#,
];
