//! File sharing handlers.

use axum::{
    body::Body,
    extract::{Host, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::{Download, FileId, UploadRequest};
use crate::web::dto::{FileInfoResponse, MessageResponse, UploadResponse};
use crate::web::error::ApiError;

use super::AppState;

/// Build a safe Content-Disposition header value.
///
/// Uses RFC 5987 encoding for non-ASCII filenames and strips
/// characters that could break the header.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

fn parse_id(id: &str) -> Result<FileId, ApiError> {
    FileId::parse(id).map_err(ApiError::from)
}

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with a single "file" field.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file or invalid multipart data"),
        (status = 413, description = "File too large"),
        (status = 415, description = "File type not allowed")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    host: Option<Host>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<UploadRequest> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large("File too large")
        } else {
            ApiError::bad_request("Invalid multipart data")
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(ApiError::bad_request("Only one file may be uploaded"));
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let content = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file content: {}", e);
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("File too large")
            } else {
                ApiError::bad_request("Failed to read file")
            }
        })?;

        let mut request = UploadRequest::new(filename, content.to_vec());
        if let Some(ct) = content_type {
            request = request.with_content_type(ct);
        }
        upload = Some(request);
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let record = state.file_service().upload(&upload).await?;

    let base_url = state.base_url(host.as_ref().map(|Host(h)| h.as_str()));
    Ok(Json(UploadResponse::from_record(&record, &base_url)))
}

/// GET /file-info/:id - Get file metadata.
#[utoipa::path(
    get,
    path = "/file-info/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileInfoResponse),
        (status = 400, description = "Invalid file ID"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FileInfoResponse>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.file_service().info(&id).await?;

    Ok(Json(FileInfoResponse::from(record)))
}

/// GET /file/:id - Download a file.
///
/// Local files are streamed as attachments. Files on the asset host
/// are served by redirect.
#[utoipa::path(
    get,
    path = "/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 302, description = "Redirect to the asset host"),
        (status = 400, description = "Invalid file ID"),
        (status = 403, description = "Uploader is offline"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let id = parse_id(&id)?;
    let download = state.file_service().download(&id).await?;

    let response = match download {
        Download::Local { record, file, len } => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, record.content_type.as_str())
            .header(
                header::CONTENT_DISPOSITION,
                content_disposition_header(&record.original_name),
            )
            .header(header::CONTENT_LENGTH, len)
            .body(Body::from_stream(ReaderStream::new(file))),
        Download::Redirect { url, .. } => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, url)
            .body(Body::empty()),
    };

    response.map_err(|e| {
        tracing::error!("Failed to build response: {}", e);
        ApiError::internal("Failed to build response")
    })
}

/// GET /uploads/:name - Serve a locally stored file inline by its stored name.
///
/// Gated by the uploader-online flag like `/file/:id`.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Uploader is offline"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let Download::Local { record, file, len } = state.file_service().download_stored(&name).await?
    else {
        return Err(ApiError::not_found("File not found"));
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, record.content_type.as_str())
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /mark-offline/:id - Disable downloads for a file.
#[utoipa::path(
    post,
    path = "/mark-offline/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Uploader marked offline", body = MessageResponse),
        (status = 400, description = "Invalid file ID"),
        (status = 404, description = "File not found")
    )
)]
pub async fn mark_offline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.file_service().set_uploader_online(&id, false).await?;

    Ok(Json(MessageResponse::new("Uploader marked offline")))
}

/// POST /mark-online/:id - Re-enable downloads for a file.
#[utoipa::path(
    post,
    path = "/mark-online/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Uploader marked online", body = MessageResponse),
        (status = 400, description = "Invalid file ID"),
        (status = 404, description = "File not found")
    )
)]
pub async fn mark_online(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.file_service().set_uploader_online(&id, true).await?;

    Ok(Json(MessageResponse::new("Uploader marked online")))
}

/// DELETE /file/:id - Delete a file and its stored bytes.
#[utoipa::path(
    delete,
    path = "/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 400, description = "Invalid file ID"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.file_service().delete(&id).await?;

    Ok(Json(MessageResponse::new("File deleted")))
}
