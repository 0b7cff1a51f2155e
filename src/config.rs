//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use axum::http::Method;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_NAMESPACE, DEFAULT_TTL_SECS};
use crate::middleware::{default_ttl_rules, CachePolicy, TtlRule, DEFAULT_BYPASS_PREFIXES, DEFAULT_MAX_BODY_BYTES};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global caching switch
    pub cache_enabled: bool,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for responses without a matching rule
    pub default_ttl: u64,
    /// Methods whose responses are cached
    pub cache_methods: Vec<Method>,
    /// Path prefixes never cached
    pub bypass_paths: Vec<String>,
    /// Per-endpoint TTL overrides
    pub ttl_rules: Vec<TtlRule>,
    /// Namespace tag on every cache key
    pub key_namespace: String,
    /// Largest response body buffered for caching
    pub max_body_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL that unmatched requests are forwarded to
    pub upstream_url: Option<String>,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Enable response caching (default: true)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_METHODS` - Comma-separated cacheable methods (default: GET)
    /// - `CACHE_BYPASS_PATHS` - Comma-separated path prefixes never cached
    /// - `CACHE_TTL_RULES` - Comma-separated `prefix=seconds` overrides
    /// - `CACHE_NAMESPACE` - Cache key namespace (default: mobile)
    /// - `MAX_BODY_BYTES` - Largest body buffered for caching (default: 8 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `UPSTREAM_URL` - Upstream base URL (default: none)
    /// - `UPSTREAM_TIMEOUT` - Upstream timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable source; unset or unparseable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            cache_enabled: lookup("CACHE_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.cache_enabled),
            max_entries: parsed::<usize, _>(&lookup, "MAX_ENTRIES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_entries),
            default_ttl: parsed(&lookup, "DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cache_methods: lookup("CACHE_METHODS")
                .map(|v| parse_list(&v, |m| Method::from_str(&m.to_ascii_uppercase()).ok()))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.cache_methods),
            bypass_paths: lookup("CACHE_BYPASS_PATHS")
                .map(|v| parse_list(&v, |p| p.starts_with('/').then(|| p.to_string())))
                .unwrap_or(defaults.bypass_paths),
            ttl_rules: lookup("CACHE_TTL_RULES")
                .map(|v| parse_list(&v, TtlRule::parse))
                .unwrap_or(defaults.ttl_rules),
            key_namespace: lookup("CACHE_NAMESPACE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.key_namespace),
            max_body_bytes: parsed(&lookup, "MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            server_port: parsed(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parsed::<u64, _>(&lookup, "CLEANUP_INTERVAL")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.cleanup_interval),
            upstream_url: lookup("UPSTREAM_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            upstream_timeout: parsed(&lookup, "UPSTREAM_TIMEOUT").unwrap_or(defaults.upstream_timeout),
        }
    }

    /// Caching policy derived from this configuration.
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            enabled: self.cache_enabled,
            methods: self.cache_methods.clone(),
            bypass_prefixes: self.bypass_paths.clone(),
            default_ttl: self.default_ttl,
            ttl_rules: self.ttl_rules.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL_SECS,
            cache_methods: vec![Method::GET],
            bypass_paths: DEFAULT_BYPASS_PREFIXES.iter().map(|p| p.to_string()).collect(),
            ttl_rules: default_ttl_rules(),
            key_namespace: DEFAULT_NAMESPACE.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            server_port: 8000,
            cleanup_interval: 1,
            upstream_url: None,
            upstream_timeout: 30,
        }
    }
}

fn parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma list, dropping blank and invalid items.
fn parse_list<T>(raw: &str, item: impl Fn(&str) -> Option<T>) -> Vec<T> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(item)
        .collect()
}
