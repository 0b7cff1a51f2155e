//! API Module
//!
//! HTTP handlers and routing for the caching front.
//!
//! # Endpoints
//! - `GET /` - Service information
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - fallback - forwarded to the upstream provider

pub mod handlers;
pub mod proxy;
pub mod routes;

pub use handlers::*;
pub use proxy::{proxy_handler, Upstream};
pub use routes::create_router;
