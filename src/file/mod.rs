//! File sharing module for Dropshare.
//!
//! This module provides:
//! - Share identifiers
//! - File records and their repository
//! - Local disk and remote asset host storage
//! - The upload / download service with the uploader-online gate

mod backend;
mod cloud;
mod id;
mod record;
mod service;
mod storage;

pub use backend::{StorageBackend, StoredFile};
pub use cloud::{sign, CloudAsset, CloudStorage};
pub use id::{FileId, FILE_ID_LEN};
pub use record::{file_type_of, FileRecord, FileRepository, NewFileRecord, StorageKind};
pub use service::{Download, FileService, UploadRequest};
pub use storage::{open_path, remove_path, sanitize_filename, LocalStorage};

/// Maximum length for a stored filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 200;

/// Default maximum file size (100MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// MIME types accepted by default.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/aac",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/csv",
    "application/json",
    "application/xml",
    "application/zip",
    "application/x-rar-compressed",
];
