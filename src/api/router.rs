//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. CORS is permissive because the web
//! client is served from a separate origin during development.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

/// Build the API router with all routes under `/api/`.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/documents", get(endpoints::documents::list))
        .route("/documents/upload", post(endpoints::documents::upload))
        .route("/documents/:id", get(endpoints::documents::detail))
        .route("/documents/:id/stages", get(endpoints::documents::stages))
        .route(
            "/documents/:id/download/pdf",
            get(endpoints::documents::download_pdf),
        )
        .route(
            "/documents/:id/download/docx",
            get(endpoints::documents::download_docx),
        )
        .with_state(ctx)
        // Raise the default 2 MB body cap to the upload limit.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", routes)
}
