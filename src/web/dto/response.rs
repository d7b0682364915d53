//! Response DTOs for Web API.
//!
//! Field names are camelCase to match what browser clients expect.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::FileRecord;

// ============================================================================
// File Responses
// ============================================================================

/// Response to a successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Share identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Where the bytes were stored (local path or asset URL).
    pub file_path: String,
    /// Absolute download link.
    pub file_url: String,
    /// Absolute metadata link.
    pub file_info_url: String,
}

impl UploadResponse {
    /// Build the response for a stored record, with links rooted at `base_url`.
    pub fn from_record(record: &FileRecord, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            id: record.id.to_string(),
            file_path: record.path.clone(),
            file_url: format!("{}/file/{}", base, record.id),
            file_info_url: format!("{}/file-info/{}", base, record.id),
        }
    }
}

/// File metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    /// Original filename.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Where the bytes are stored.
    pub file_path: String,
    /// Extension of the original filename.
    pub file_type: String,
    /// MIME type.
    pub content_type: String,
    /// Whether downloads are currently allowed.
    pub is_uploader_online: bool,
    /// Upload time (RFC3339).
    pub created_at: String,
}

impl From<FileRecord> for FileInfoResponse {
    fn from(record: FileRecord) -> Self {
        let file_type = record.file_type().to_string();
        Self {
            name: record.original_name,
            size: record.size,
            file_path: record.path,
            file_type,
            content_type: record.content_type,
            is_uploader_online: record.is_uploader_online,
            created_at: to_rfc3339(&record.created_at),
        }
    }
}

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
