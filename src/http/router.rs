//! Router configuration for the HTTP API.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/archive/information",
            post(handlers::archive_information).fallback(handlers::method_not_allowed),
        )
        .route(
            "/archive/files",
            post(handlers::archive_files).fallback(handlers::method_not_allowed),
        )
        .route(
            "/mail/file",
            post(handlers::mail_file).fallback(handlers::method_not_allowed),
        );

    Router::new()
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::health_method_not_allowed),
        )
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
