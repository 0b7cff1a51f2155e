//! Cache Policy
//!
//! Decides which requests take part in caching and for how long their
//! responses are kept.

use axum::http::Method;

use crate::cache::DEFAULT_TTL_SECS;

/// Path prefixes excluded from caching by default: documentation UIs, the
/// schema endpoint, static assets and the service's own stats.
pub const DEFAULT_BYPASS_PREFIXES: &[&str] = &["/docs", "/redoc", "/openapi.json", "/static", "/stats"];

/// Default cap on a response body buffered for caching (8 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

// == TTL Rule ==
/// Per-endpoint TTL override, matched by path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlRule {
    pub prefix: String,
    pub ttl: u64,
}

impl TtlRule {
    pub fn new(prefix: impl Into<String>, ttl: u64) -> Self {
        Self {
            prefix: prefix.into(),
            ttl,
        }
    }

    /// Parses `prefix=seconds`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (prefix, ttl) = raw.trim().split_once('=')?;
        let prefix = prefix.trim();
        if !prefix.starts_with('/') {
            return None;
        }
        Some(Self::new(prefix, ttl.trim().parse().ok()?))
    }
}

/// TTLs for the mobile data endpoints: quotes move fast, profiles hardly at all.
pub fn default_ttl_rules() -> Vec<TtlRule> {
    vec![
        TtlRule::new("/api/v2/mobile/yfinance/quote", 60),
        TtlRule::new("/api/v2/mobile/yfinance/screener", 900),
        TtlRule::new("/api/v2/mobile/yfinance/historical", 86_400),
        TtlRule::new("/api/v2/mobile/yfinance/profile", 604_800),
    ]
}

// == Decision ==
/// Why a request skipped the cache entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    Disabled,
    Method,
    ExcludedPath,
}

/// First step of the per-request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Bypass(BypassReason),
    Lookup,
}

// == Cache Policy ==
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Global switch
    pub enabled: bool,
    /// Methods whose responses may be cached
    pub methods: Vec<Method>,
    /// Paths starting with any of these are never looked up or stored
    pub bypass_prefixes: Vec<String>,
    /// TTL when no rule matches
    pub default_ttl: u64,
    /// Per-endpoint overrides; the longest matching prefix wins
    pub ttl_rules: Vec<TtlRule>,
    /// Largest body stored; bigger responses are relayed without caching
    pub max_body_bytes: usize,
}

impl CachePolicy {
    /// Classifies a request before any store access.
    pub fn decide(&self, method: &Method, path: &str) -> Decision {
        if !self.enabled {
            return Decision::Bypass(BypassReason::Disabled);
        }
        if !self.methods.contains(method) {
            return Decision::Bypass(BypassReason::Method);
        }
        if self.is_bypassed(path) {
            return Decision::Bypass(BypassReason::ExcludedPath);
        }
        Decision::Lookup
    }

    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// TTL applied to responses for `path`.
    pub fn ttl_for(&self, path: &str) -> u64 {
        self.ttl_rules
            .iter()
            .filter(|rule| path.starts_with(rule.prefix.as_str()))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.ttl)
            .unwrap_or(self.default_ttl)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            methods: vec![Method::GET],
            bypass_prefixes: DEFAULT_BYPASS_PREFIXES.iter().map(|p| p.to_string()).collect(),
            default_ttl: DEFAULT_TTL_SECS,
            ttl_rules: default_ttl_rules(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
