//! API handlers for the Dropshare web API.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::config::FilesConfig;
use crate::file::{FileService, StorageBackend, DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE};
use crate::Database;

/// Database handle shared across handlers.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SharedDatabase,
    /// Where uploads are stored.
    pub storage: StorageBackend,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Accepted MIME types (empty accepts everything).
    pub allowed_mime_types: Vec<String>,
    /// Base URL for generated links. Falls back to the request host.
    pub public_url: Option<String>,
}

impl AppState {
    /// Create a new application state with default limits.
    pub fn new(db: SharedDatabase, storage: StorageBackend) -> Self {
        Self {
            db,
            storage,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            public_url: None,
        }
    }

    /// Apply upload limits from the files configuration.
    pub fn with_files_config(mut self, files: &FilesConfig) -> Self {
        self.max_upload_size = files.max_upload_size_bytes();
        self.allowed_mime_types = files.allowed_mime_types.clone();
        self
    }

    /// Set the base URL for generated links.
    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// File service bound to this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.storage)
            .with_max_file_size(self.max_upload_size)
            .with_allowed_mime_types(self.allowed_mime_types.clone())
    }

    /// Base URL for links in a response to a request for `host`.
    pub fn base_url(&self, host: Option<&str>) -> String {
        match (&self.public_url, host) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("http://{}", host),
            (None, None) => "http://localhost".to_string(),
        }
    }
}
