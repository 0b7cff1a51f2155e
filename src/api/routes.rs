//! API Routes
//!
//! Configures the Axum router: local endpoints, the upstream fallback and
//! the response cache in front of both.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, root_handler, stats_handler, AppState};
use super::proxy::proxy_handler;
use crate::middleware::cache_responses;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Service information
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache statistics
/// - anything else - forwarded to the upstream, when configured
///
/// # Middleware
/// - Response cache (innermost, wraps routes and fallback)
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .fallback(proxy_handler)
        .layer(middleware::from_fn_with_state(
            state.interceptor.clone(),
            cache_responses,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
