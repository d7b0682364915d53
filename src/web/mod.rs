//! Web API module for Dropshare.
//!
//! This module provides the HTTP interface: upload, metadata, download,
//! uploader-online toggling and deletion.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
