//! Response models for the service's own endpoints
//!
//! Upstream payloads pass through untouched; only the health, root and
//! stats bodies are defined here.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, RootResponse, StatsResponse, SERVICE_NAME};
