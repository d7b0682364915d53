//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::WebConfig;

use super::handlers::{
    delete_file, download_file, get_file_info, mark_offline, mark_online, serve_upload,
    upload_file, AppState,
};
use super::middleware::create_cors_layer;
use super::openapi::ApiDoc;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Create the main API router.
///
/// File routes are served both at the root and under `/api`.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let file_routes = Router::new()
        .route("/upload", post(upload_file))
        .route("/file-info/:id", get(get_file_info))
        .route("/file/:id", get(download_file).delete(delete_file))
        .route("/mark-offline/:id", post(mark_offline))
        .route("/mark-online/:id", post(mark_online));

    let mut router = Router::new()
        .route("/app", get(hello))
        .merge(file_routes.clone())
        .nest("/api", file_routes);

    if web_config.serve_uploads && app_state.storage.local().is_some() {
        router = router.route("/uploads/:name", get(serve_upload));
    }

    let body_limit = usize::try_from(app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Liveness message for browser clients.
async fn hello() -> &'static str {
    "Hello World!"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
    }

    #[test]
    fn test_create_swagger_router() {
        let _router = create_swagger_router();
    }
}
