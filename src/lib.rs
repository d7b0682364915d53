//! Dropshare - minimal file sharing backend
//!
//! Upload a file, hand out a link, and serve downloads only while the
//! uploader says they are online.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, ShareError};
pub use file::{FileId, FileRecord, FileService, StorageBackend};
pub use web::WebServer;
