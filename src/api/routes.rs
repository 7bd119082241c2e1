use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    Router::new()
        // Files
        .route("/v1/files", get(handlers::list_files))
        .route(
            "/v1/files",
            post(handlers::create_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/v1/files/create-from-object-path",
            post(handlers::create_file_from_object_path),
        )
        .route("/v1/files/:id", get(handlers::get_file))
        .route("/v1/files/:id", delete(handlers::delete_file))
        // Internal-trust routes; must stay behind the internal listener or
        // network policy, since they bypass project isolation.
        .route(
            "/_internal/worker/files/:id/path",
            get(handlers::get_worker_file_path),
        )
        .route(
            "/_internal/files/:id/path",
            get(handlers::get_internal_file_path),
        )
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
