//! OpenAPI documentation.

use utoipa::OpenApi;

use super::dto::{FileInfoResponse, MessageResponse, UploadResponse};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::file;

/// OpenAPI document for the file sharing API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dropshare API",
        description = "Share files by link while the uploader is online."
    ),
    paths(
        file::upload_file,
        file::get_file_info,
        file::download_file,
        file::mark_offline,
        file::mark_online,
        file::delete_file,
        file::serve_upload,
    ),
    components(schemas(
        UploadResponse,
        FileInfoResponse,
        MessageResponse,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "files", description = "File upload, metadata and download")
    )
)]
pub struct ApiDoc;
