//! Database schema and migrations for Dropshare.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Shared files
    r#"
CREATE TABLE files (
    id                  TEXT PRIMARY KEY,               -- 24 hex chars
    filename            TEXT NOT NULL,                  -- stored name or asset public id
    original_name       TEXT NOT NULL,
    path                TEXT NOT NULL,                  -- local path or asset URL
    size                INTEGER NOT NULL,
    content_type        TEXT NOT NULL DEFAULT 'application/octet-stream',
    storage             TEXT NOT NULL DEFAULT 'local',  -- 'local' or 'cloud'
    cloud_url           TEXT,
    cloud_public_id     TEXT,
    cloud_resource_type TEXT,
    is_uploader_online  INTEGER NOT NULL DEFAULT 1,
    created_at          TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_created_at ON files(created_at);
"#,
];
