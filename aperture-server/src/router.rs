//! Route table and middleware stack

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Room on top of the per-file ceiling for multipart framing, so the
/// repository (not the body limit) decides when an image is too large.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router: the JSON API plus static assets for
/// everything else (portfolio page, admin panel, published images).
pub fn build_router(state: AppState, public_dir: &Path, max_upload_bytes: u64) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/images", get(handlers::list_images))
        .route("/api/upload", post(handlers::upload))
        .route("/api/images/{filename}", delete(handlers::delete_image))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes as usize + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
