//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, clear_handler, decrement_handler, delete_handler, forget_many_handler,
    get_handler, health_handler, increment_handler, many_handler, pull_handler, put_handler,
    put_many_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", delete(clear_handler))
        .route(
            "/cache/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/cache/:key/add", post(add_handler))
        .route("/cache/:key/pull", post(pull_handler))
        .route("/cache/:key/increment", post(increment_handler))
        .route("/cache/:key/decrement", post(decrement_handler))
        .route("/batch", put(put_many_handler))
        .route("/batch/get", post(many_handler))
        .route("/batch/forget", post(forget_many_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
