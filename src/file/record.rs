//! Shared file records and their repository.

use crate::db::DbPool;
use crate::{Result, ShareError};

use super::id::FileId;

const SELECT_COLUMNS: &str = "id, filename, original_name, path, size, content_type, storage,
     cloud_url, cloud_public_id, cloud_resource_type, is_uploader_online, created_at, updated_at";

/// Where the bytes of a file live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Local disk.
    Local,
    /// Remote asset host.
    Cloud,
}

impl StorageKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Local => "local",
            StorageKind::Cloud => "cloud",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "local" => Some(StorageKind::Local),
            "cloud" => Some(StorageKind::Cloud),
            _ => None,
        }
    }
}

/// A shared file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Share identifier.
    pub id: FileId,
    /// Stored filename (local) or asset public id (cloud).
    pub filename: String,
    /// Filename as supplied by the uploader.
    pub original_name: String,
    /// Local file path or asset URL.
    pub path: String,
    /// File size in bytes.
    pub size: i64,
    /// MIME type reported at upload.
    pub content_type: String,
    /// Storage backend name ("local" or "cloud").
    pub storage: String,
    /// Asset host delivery URL.
    pub cloud_url: Option<String>,
    /// Asset host public id.
    pub cloud_public_id: Option<String>,
    /// Asset host resource type (image, video, raw).
    pub cloud_resource_type: Option<String>,
    /// Whether downloads are currently allowed.
    pub is_uploader_online: bool,
    /// Upload timestamp (UTC, SQLite format).
    pub created_at: String,
    /// Last modification timestamp (UTC, SQLite format).
    pub updated_at: String,
}

impl FileRecord {
    /// Storage backend as enum. Unknown values are treated as local.
    pub fn storage_kind(&self) -> StorageKind {
        StorageKind::from_str(&self.storage).unwrap_or(StorageKind::Local)
    }

    /// File type derived from the original name: the text after the last dot.
    pub fn file_type(&self) -> &str {
        file_type_of(&self.original_name)
    }
}

/// Text after the last `.` of a name, or the whole name when it has no dot.
pub fn file_type_of(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Share identifier.
    pub id: FileId,
    /// Stored filename or asset public id.
    pub filename: String,
    /// Original filename.
    pub original_name: String,
    /// Local path or asset URL.
    pub path: String,
    /// File size in bytes.
    pub size: i64,
    /// MIME type.
    pub content_type: String,
    /// Storage backend.
    pub storage: StorageKind,
    /// Asset host delivery URL.
    pub cloud_url: Option<String>,
    /// Asset host public id.
    pub cloud_public_id: Option<String>,
    /// Asset host resource type.
    pub cloud_resource_type: Option<String>,
}

impl NewFileRecord {
    /// Create a record for a locally stored file with a fresh identifier.
    pub fn local(
        filename: impl Into<String>,
        original_name: impl Into<String>,
        path: impl Into<String>,
        size: i64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: FileId::generate(),
            filename: filename.into(),
            original_name: original_name.into(),
            path: path.into(),
            size,
            content_type: content_type.into(),
            storage: StorageKind::Local,
            cloud_url: None,
            cloud_public_id: None,
            cloud_resource_type: None,
        }
    }

    /// Attach asset host identifiers and mark the record as cloud-stored.
    pub fn with_cloud(
        mut self,
        url: impl Into<String>,
        public_id: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        self.storage = StorageKind::Cloud;
        self.cloud_url = Some(url.into());
        self.cloud_public_id = Some(public_id.into());
        self.cloud_resource_type = Some(resource_type.into());
        self
    }
}

/// Repository for file records.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    pub async fn create(&self, file: &NewFileRecord) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO files (id, filename, original_name, path, size, content_type, storage,
                                cloud_url, cloud_public_id, cloud_resource_type)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.id)
        .bind(&file.filename)
        .bind(&file.original_name)
        .bind(&file.path)
        .bind(file.size)
        .bind(&file.content_type)
        .bind(file.storage.as_str())
        .bind(&file.cloud_url)
        .bind(&file.cloud_public_id)
        .bind(&file.cloud_resource_type)
        .execute(self.pool)
        .await?;

        self.get_by_id(&file.id)
            .await?
            .ok_or_else(|| ShareError::NotFound("File".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: &FileId) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Get a locally stored file record by its stored filename.
    pub async fn get_local_by_filename(&self, filename: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM files WHERE filename = ? AND storage = 'local'"
        ))
        .bind(filename)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Set the uploader-online flag.
    ///
    /// Returns the updated record, or `None` if no record has this ID.
    pub async fn set_uploader_online(&self, id: &FileId, online: bool) -> Result<Option<FileRecord>> {
        let result = sqlx::query(
            "UPDATE files SET is_uploader_online = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(online)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a file record by ID.
    pub async fn delete(&self, id: &FileId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all file records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
