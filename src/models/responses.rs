//! Response DTOs for the service's own endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Service name reported by the root and health endpoints
pub const SERVICE_NAME: &str = "mobile_cache";

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    pub version: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache_enabled: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache_enabled: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache_enabled,
        }
    }
}

/// Response body for the root endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub health: String,
    pub stats: String,
    /// Whether unmatched requests are forwarded upstream
    pub upstream_configured: bool,
}

impl RootResponse {
    pub fn new(upstream_configured: bool) -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            health: "/health".to_string(),
            stats: "/stats".to_string(),
            upstream_configured,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub stores: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    pub max_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, max_entries: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            stores: stats.stores,
            total_entries: stats.total_entries,
            max_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(true);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["cache_enabled"], true);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_root_response() {
        let resp = RootResponse::new(false);
        assert_eq!(resp.name, SERVICE_NAME);
        assert_eq!(resp.stats, "/stats");
        assert!(!resp.upstream_configured);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            expirations: 1,
            stores: 30,
            total_entries: 25,
        };
        let resp = StatsResponse::new(&stats, 100);

        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.max_entries, 100);
        assert_eq!(resp.total_entries, 25);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(&CacheStats::default(), 10);
        assert_eq!(resp.hit_rate, 0.0);
    }
}
