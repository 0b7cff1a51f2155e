//! Mobile Cache - a caching front for slow upstream data providers
//!
//! Answers repeat GET requests from an in-memory store with per-entry TTLs
//! and LRU eviction, and forwards everything else.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{build_key, CacheKey, CacheStore, KeyBuilder, SharedStore};
pub use config::Config;
pub use middleware::{cache_responses, CachePolicy, ResponseInterceptor};
pub use tasks::spawn_cleanup_task;
