//! API Handlers
//!
//! HTTP request handlers for the service's own endpoints.

use axum::{extract::State, Json};

use crate::cache::{CacheStore, KeyBuilder, SharedStore};
use crate::config::Config;
use crate::error::Result;
use crate::middleware::{CachePolicy, ResponseInterceptor};
use crate::models::{HealthResponse, RootResponse, StatsResponse};

use super::proxy::Upstream;

/// Application state shared across all handlers.
///
/// The store is created once and injected here; the interceptor and the
/// stats handler see the same instance.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe response store
    pub store: SharedStore,
    /// Caching middleware state
    pub interceptor: ResponseInterceptor,
    /// Where unmatched requests are forwarded, if anywhere
    pub upstream: Option<Upstream>,
}

impl AppState {
    /// Creates a new AppState around `store` with the given policy.
    pub fn new(store: SharedStore, policy: CachePolicy) -> Self {
        let interceptor = ResponseInterceptor::new(store.clone(), KeyBuilder::default(), policy);
        Self {
            store,
            interceptor,
            upstream: None,
        }
    }

    /// Sets the upstream that unmatched requests are forwarded to.
    pub fn with_upstream(mut self, upstream: Upstream) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = CacheStore::shared(config.max_entries);
        let keys = KeyBuilder::new(config.key_namespace.clone());
        let interceptor = ResponseInterceptor::new(store.clone(), keys, config.policy());

        let upstream = config
            .upstream_url
            .as_deref()
            .map(|url| Upstream::new(url, config.upstream_timeout))
            .transpose()?;

        Ok(Self {
            store,
            interceptor,
            upstream,
        })
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.interceptor.policy().enabled))
}

/// Handler for GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse::new(state.upstream.is_some()))
}

/// Handler for GET /stats
///
/// Read-only view of the store counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.store.stats();
    Json(StatsResponse::new(&stats, state.store.capacity()))
}
