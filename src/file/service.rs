//! File service for Dropshare.
//!
//! High-level operations on shared files:
//! - Upload with size and MIME-type checks
//! - Metadata lookup
//! - Download gated by the uploader-online flag
//! - Online/offline toggling and deletion

use std::path::Path;

use tokio::fs::File;

use crate::db::Database;
use crate::{Result, ShareError};

use super::backend::StorageBackend;
use super::id::FileId;
use super::record::{FileRecord, FileRepository, NewFileRecord, StorageKind};
use super::storage::open_path;
use super::{DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE};

/// Message returned when a download is refused because the uploader is offline.
pub const UPLOADER_OFFLINE_MESSAGE: &str = "Uploader is offline. File download disabled.";

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub original_name: String,
    /// MIME type reported by the client.
    pub content_type: Option<String>,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            content,
        }
    }

    /// Set the reported MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// MIME type to record: the reported one without parameters, or a
    /// guess from the filename when none was reported.
    pub fn resolved_content_type(&self) -> String {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&self.original_name)
                    .first_or_octet_stream()
                    .to_string()
            })
    }
}

/// How a download is served.
#[derive(Debug)]
pub enum Download {
    /// Stream a local file.
    Local {
        /// File record.
        record: FileRecord,
        /// Open file handle.
        file: File,
        /// File length in bytes.
        len: u64,
    },
    /// Redirect to the asset host.
    Redirect {
        /// File record.
        record: FileRecord,
        /// Delivery URL.
        url: String,
    },
}

/// File service for uploads, downloads and the uploader-online gate.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a StorageBackend,
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
}

impl<'a> FileService<'a> {
    /// Create a new FileService with default limits.
    pub fn new(db: &'a Database, storage: &'a StorageBackend) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Set the maximum file size in bytes.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Set the accepted MIME types. An empty list accepts everything.
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    fn repo(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }

    fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_mime_types.is_empty()
            || self
                .allowed_mime_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(content_type))
    }

    /// Upload a file.
    ///
    /// # Validation
    /// - Filename must not be empty
    /// - Content must not be empty
    /// - File size: max configured size (default 100MB)
    /// - MIME type must be in the allow-list (when the list is non-empty)
    ///
    /// # Returns
    /// The created record, with the uploader marked online.
    pub async fn upload(&self, request: &UploadRequest) -> Result<FileRecord> {
        let original_name = request.original_name.trim();
        if original_name.is_empty() {
            return Err(ShareError::Validation("file name is empty".to_string()));
        }

        if request.content.is_empty() {
            return Err(ShareError::Validation("file is empty".to_string()));
        }

        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(ShareError::PayloadTooLarge(format!(
                "file exceeds the {max_mb}MB limit"
            )));
        }

        let content_type = request.resolved_content_type();
        if !self.is_allowed(&content_type) {
            return Err(ShareError::UnsupportedMediaType(format!(
                "file type not allowed: {content_type}"
            )));
        }

        let stored = self
            .storage
            .store(&request.content, original_name, &content_type)
            .await?;

        let mut new_file = NewFileRecord::local(
            &stored.filename,
            original_name,
            &stored.path,
            request.content.len() as i64,
            &content_type,
        );
        if let Some(ref asset) = stored.cloud {
            new_file = new_file.with_cloud(&asset.secure_url, &asset.public_id, &asset.resource_type);
        }

        let record = match self.repo().create(&new_file).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.storage.discard(&stored).await {
                    tracing::warn!(
                        error = %cleanup,
                        path = %stored.path,
                        "Failed to remove stored bytes after insert failure"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            file_id = %record.id,
            size = record.size,
            backend = record.storage_kind().as_str(),
            "File uploaded"
        );

        Ok(record)
    }

    /// Get a file record.
    pub async fn info(&self, id: &FileId) -> Result<FileRecord> {
        self.repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareError::NotFound("File".to_string()))
    }

    /// Prepare a download.
    ///
    /// Refused with `Forbidden` while the uploader is offline.
    pub async fn download(&self, id: &FileId) -> Result<Download> {
        let record = self.info(id).await?;
        ensure_uploader_online(&record)?;

        match record.storage_kind() {
            StorageKind::Local => {
                let (file, len) = open_path(Path::new(&record.path)).await.map_err(|e| {
                    if matches!(e, ShareError::NotFound(_)) {
                        tracing::warn!(file_id = %id, path = %record.path, "Stored file is missing");
                        ShareError::NotFound("File".to_string())
                    } else {
                        e
                    }
                })?;
                Ok(Download::Local { record, file, len })
            }
            StorageKind::Cloud => {
                let url = record.cloud_url.clone().unwrap_or_else(|| record.path.clone());
                Ok(Download::Redirect { record, url })
            }
        }
    }

    /// Prepare a download of a locally stored file by its stored name.
    ///
    /// Subject to the same uploader-online gate as [`FileService::download`].
    /// Only available while local storage is the active backend.
    pub async fn download_stored(&self, filename: &str) -> Result<Download> {
        let local = self
            .storage
            .local()
            .ok_or_else(|| ShareError::NotFound("File".to_string()))?;

        let record = self
            .repo()
            .get_local_by_filename(filename)
            .await?
            .ok_or_else(|| ShareError::NotFound("File".to_string()))?;
        ensure_uploader_online(&record)?;

        let (file, len) = local.open(&record.filename).await.map_err(|e| {
            if matches!(e, ShareError::NotFound(_)) {
                tracing::warn!(file_id = %record.id, filename, "Stored file is missing");
                ShareError::NotFound("File".to_string())
            } else {
                e
            }
        })?;

        Ok(Download::Local { record, file, len })
    }

    /// Set the uploader-online flag.
    pub async fn set_uploader_online(&self, id: &FileId, online: bool) -> Result<FileRecord> {
        let record = self
            .repo()
            .set_uploader_online(id, online)
            .await?
            .ok_or_else(|| ShareError::NotFound("File".to_string()))?;

        tracing::info!(file_id = %id, online, "Uploader status changed");
        Ok(record)
    }

    /// Delete a file and its stored bytes.
    ///
    /// Failure to remove the bytes is logged and does not keep the record.
    ///
    /// # Returns
    /// The deleted record.
    pub async fn delete(&self, id: &FileId) -> Result<FileRecord> {
        let record = self.info(id).await?;

        match self.storage.remove(&record).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(file_id = %id, "Stored bytes already gone"),
            Err(e) => tracing::warn!(file_id = %id, error = %e, "Failed to remove stored bytes"),
        }

        self.repo().delete(id).await?;
        tracing::info!(file_id = %id, "File deleted");

        Ok(record)
    }
}

fn ensure_uploader_online(record: &FileRecord) -> Result<()> {
    if record.is_uploader_online {
        return Ok(());
    }

    tracing::debug!(file_id = %record.id, "Download refused, uploader offline");
    Err(ShareError::Forbidden(UPLOADER_OFFLINE_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::LocalStorage;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    async fn setup() -> (TempDir, Database, StorageBackend) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let storage = StorageBackend::Local(LocalStorage::new(dir.path()).unwrap());
        (dir, db, storage)
    }

    fn text_upload(name: &str, content: &[u8]) -> UploadRequest {
        UploadRequest::new(name, content.to_vec()).with_content_type("text/plain")
    }

    #[tokio::test]
    async fn test_upload_success() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        assert_eq!(record.original_name, "hello.txt");
        assert_eq!(record.size, 5);
        assert_eq!(record.content_type, "text/plain");
        assert_eq!(record.file_type(), "txt");
        assert!(record.is_uploader_online);
        assert!(record.filename.ends_with("-hello.txt"));
        assert!(Path::new(&record.path).exists());
    }

    #[tokio::test]
    async fn test_upload_empty_content() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let result = service.upload(&text_upload("empty.txt", b"")).await;
        assert!(matches!(result, Err(ShareError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_empty_name() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let result = service.upload(&text_upload("   ", b"data")).await;
        assert!(matches!(result, Err(ShareError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage).with_max_file_size(4);

        let result = service.upload(&text_upload("big.txt", b"12345")).await;
        assert!(matches!(result, Err(ShareError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_upload_rejected_mime_type() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let request = UploadRequest::new("tool.exe", b"MZ".to_vec())
            .with_content_type("application/x-msdownload");
        let result = service.upload(&request).await;

        assert!(matches!(result, Err(ShareError::UnsupportedMediaType(_))));
        assert_eq!(FileRepository::new(db.pool()).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_any_type_when_allow_list_empty() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage).with_allowed_mime_types(vec![]);

        let request = UploadRequest::new("tool.exe", b"MZ".to_vec())
            .with_content_type("application/x-msdownload");

        assert!(service.upload(&request).await.is_ok());
    }

    #[test]
    fn test_resolved_content_type() {
        let request = UploadRequest::new("a.txt", vec![1]).with_content_type("Text/Plain; charset=utf-8");
        assert_eq!(request.resolved_content_type(), "text/plain");

        let request = UploadRequest::new("photo.png", vec![1]);
        assert_eq!(request.resolved_content_type(), "image/png");

        let request = UploadRequest::new("blob", vec![1]);
        assert_eq!(request.resolved_content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_info_not_found() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let result = service.info(&FileId::generate()).await;
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_local() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        match service.download(&record.id).await.unwrap() {
            Download::Local {
                record: r,
                mut file,
                len,
            } => {
                assert_eq!(r.id, record.id);
                assert_eq!(len, 5);
                let mut content = Vec::new();
                file.read_to_end(&mut content).await.unwrap();
                assert_eq!(content, b"Hello");
            }
            Download::Redirect { .. } => panic!("expected local download"),
        }
    }

    #[tokio::test]
    async fn test_download_refused_when_offline() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        service.set_uploader_online(&record.id, false).await.unwrap();

        let result = service.download(&record.id).await;
        assert!(
            matches!(result, Err(ShareError::Forbidden(ref msg)) if msg == UPLOADER_OFFLINE_MESSAGE)
        );

        service.set_uploader_online(&record.id, true).await.unwrap();
        assert!(service.download(&record.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_download_missing_bytes() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        std::fs::remove_file(&record.path).unwrap();

        let result = service.download(&record.id).await;
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_cloud_record_redirects() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let new_file = NewFileRecord::local(
            "file-sharing/abc",
            "clip.mp4",
            "https://res.example.com/video/upload/abc.mp4",
            10,
            "video/mp4",
        )
        .with_cloud(
            "https://res.example.com/video/upload/abc.mp4",
            "file-sharing/abc",
            "video",
        );
        let record = FileRepository::new(db.pool()).create(&new_file).await.unwrap();

        match service.download(&record.id).await.unwrap() {
            Download::Redirect { url, .. } => {
                assert_eq!(url, "https://res.example.com/video/upload/abc.mp4");
            }
            Download::Local { .. } => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_download_stored_respects_offline_flag() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        match service.download_stored(&record.filename).await.unwrap() {
            Download::Local { mut file, len, .. } => {
                assert_eq!(len, 5);
                let mut content = Vec::new();
                file.read_to_end(&mut content).await.unwrap();
                assert_eq!(content, b"Hello");
            }
            Download::Redirect { .. } => panic!("expected local file"),
        }

        service.set_uploader_online(&record.id, false).await.unwrap();

        let result = service.download_stored(&record.filename).await;
        assert!(
            matches!(result, Err(ShareError::Forbidden(ref msg)) if msg == UPLOADER_OFFLINE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_download_stored_unknown_name() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let result = service.download_stored("1700000000000-nothing.txt").await;
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_stored_ignores_unrecorded_files() {
        let (dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        std::fs::write(dir.path().join("stray.txt"), b"stray").unwrap();

        let result = service.download_stored("stray.txt").await;
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_uploader_online_not_found() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let result = service.set_uploader_online(&FileId::generate(), false).await;
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_bytes() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);
        let record = service
            .upload(&text_upload("hello.txt", b"Hello"))
            .await
            .unwrap();

        let deleted = service.delete(&record.id).await.unwrap();

        assert_eq!(deleted.id, record.id);
        assert!(!Path::new(&record.path).exists());
        assert!(matches!(
            service.info(&record.id).await,
            Err(ShareError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&record.id).await,
            Err(ShareError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cloud_record_without_cloud_backend() {
        let (_dir, db, storage) = setup().await;
        let service = FileService::new(&db, &storage);

        let new_file = NewFileRecord::local("p", "a.png", "https://x/a.png", 1, "image/png")
            .with_cloud("https://x/a.png", "file-sharing/a", "image");
        let record = FileRepository::new(db.pool()).create(&new_file).await.unwrap();

        // Bytes cannot be removed, the record still goes.
        service.delete(&record.id).await.unwrap();
        assert!(service.info(&record.id).await.is_err());
    }
}
