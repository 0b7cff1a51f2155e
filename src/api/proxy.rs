//! Upstream Forwarding
//!
//! Fallback handler that relays unmatched requests to the configured data
//! provider and streams its answer back. This is the downstream handler the
//! cache sits in front of when running as a standalone binary.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    response::Response,
};
use tracing::{debug, warn};

use super::handlers::AppState;
use crate::error::{CacheError, Result};

/// Largest request body forwarded upstream (1 MiB)
pub const MAX_FORWARD_BODY_BYTES: usize = 1024 * 1024;

// == Upstream ==
/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| CacheError::Internal(format!("failed to build upstream client: {}", err)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `request` upstream and returns the upstream response with its
    /// body streamed through unbuffered.
    pub async fn forward(&self, request: Request) -> Result<Response> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let body = to_bytes(body, MAX_FORWARD_BODY_BYTES)
            .await
            .map_err(|err| CacheError::InvalidRequest(format!("request body: {}", err)))?;

        debug!(method = %parts.method, %url, "forwarding upstream");

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(strip_hop_by_hop(parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, "upstream request failed");
                CacheError::from(err)
            })?;

        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers().clone());

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Drops connection-scoped headers that must not be relayed.
fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    let hop_by_hop = [
        header::CONNECTION,
        header::HOST,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ];
    for name in hop_by_hop {
        headers.remove(name);
    }
    headers
}

/// Fallback handler for every path without a local route.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    match &state.upstream {
        Some(upstream) => upstream.forward(request).await,
        None => Err(CacheError::NotFound(format!(
            "{} (no upstream configured)",
            request.uri().path()
        ))),
    }
}
