//! Response Interceptor
//!
//! Axum middleware that answers repeat GETs from the store and records
//! successful JSON responses on the way out.
//!
//! Per request: decide (bypass or look up), then either replay a hit or
//! forward to the downstream handlers, buffer the body when it is worth
//! storing, store it, and relay the rebuilt response.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderName, HeaderValue, StatusCode, Uri,
    },
    middleware::Next,
    response::Response,
};
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use tracing::{debug, warn};

use crate::cache::{CacheKey, JsonPayload, KeyBuilder, SharedStore};
use crate::middleware::policy::{CachePolicy, Decision};

/// Header reporting whether the cache answered the request.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

const HIT: HeaderValue = HeaderValue::from_static("HIT");
const MISS: HeaderValue = HeaderValue::from_static("MISS");

// == Outcomes ==
/// Result of consulting the store.
#[derive(Debug)]
pub enum Lookup {
    /// Stored payload bytes, replayed verbatim
    Hit(Bytes),
    Miss,
}

/// Why a live response was relayed without being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Status other than 200
    Status(StatusCode),
    /// Content type is missing or not JSON
    NotJson,
    /// Body is larger than the buffering limit
    TooLarge,
    /// Body did not parse as JSON
    InvalidJson,
}

/// What happened to a live response after capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    Skipped(SkipReason),
}

/// A response body read up to the buffering limit.
enum Buffered {
    Complete(Bytes),
    /// The limit was crossed; holds the bytes already read chained with the
    /// unread remainder
    Overflow(Body),
    Failed(axum::Error),
}

// == Response Interceptor ==
/// Shared state of the caching middleware.
#[derive(Clone)]
pub struct ResponseInterceptor {
    store: SharedStore,
    keys: KeyBuilder,
    policy: Arc<CachePolicy>,
}

impl ResponseInterceptor {
    pub fn new(store: SharedStore, keys: KeyBuilder, policy: CachePolicy) -> Self {
        Self {
            store,
            keys,
            policy: Arc::new(policy),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Key for a request, or `None` when its query string cannot be parsed.
    ///
    /// The path is keyed as received, the same form the router matches on,
    /// so `/quote%2Fx` and `/quote/x` are distinct entries.
    pub fn key_for(&self, method: &str, uri: &Uri) -> Option<CacheKey> {
        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
        Some(self.keys.build_key(method, uri.path(), &params))
    }

    // == Lookup ==
    fn lookup(&self, key: &CacheKey) -> Lookup {
        match self.store.get(key.as_str()) {
            Some(payload) => Lookup::Hit(payload.into_bytes()),
            None => Lookup::Miss,
        }
    }

    // == Capture ==
    /// Buffers and stores a live response when eligible, then rebuilds it.
    async fn capture(&self, key: CacheKey, ttl: u64, response: Response) -> Response {
        let (mut parts, body) = response.into_parts();
        let limit = self.policy.max_body_bytes;

        if let Some(reason) = skip_reason(parts.status, &parts.headers, limit) {
            // Not storable: leave the body streaming untouched
            debug!(key = %key, ?reason, "cache miss, response not stored");
            parts.headers.insert(X_CACHE, MISS);
            return Response::from_parts(parts, body);
        }

        let bytes = match buffer_body(body, limit).await {
            Buffered::Complete(bytes) => bytes,
            Buffered::Overflow(body) => {
                debug!(key = %key, reason = ?SkipReason::TooLarge, "cache miss, response not stored");
                parts.headers.insert(X_CACHE, MISS);
                return Response::from_parts(parts, body);
            }
            Buffered::Failed(err) => {
                // The body is gone; answer with a well-formed empty response
                warn!(key = %key, error = %err, "failed to buffer response body");
                parts.headers.remove(CONTENT_LENGTH);
                return Response::from_parts(parts, Body::empty());
            }
        };

        let outcome = match JsonPayload::from_bytes(bytes.clone()) {
            Ok(payload) => {
                self.store.set(key.as_str(), payload, ttl);
                StoreOutcome::Stored
            }
            Err(_) => StoreOutcome::Skipped(SkipReason::InvalidJson),
        };
        debug!(key = %key, ttl, ?outcome, "cache miss");

        parts.headers.insert(X_CACHE, MISS);
        Response::from_parts(parts, Body::from(bytes))
    }
}

// == Middleware ==
/// Caching middleware, installed with `axum::middleware::from_fn_with_state`.
pub async fn cache_responses(
    State(interceptor): State<ResponseInterceptor>,
    request: Request,
    next: Next,
) -> Response {
    if let Decision::Bypass(reason) = interceptor.policy.decide(request.method(), request.uri().path()) {
        debug!(path = %request.uri().path(), ?reason, "cache bypass");
        return next.run(request).await;
    }

    let Some(key) = interceptor.key_for(request.method().as_str(), request.uri()) else {
        debug!(uri = %request.uri(), "unparseable query string, cache bypass");
        return next.run(request).await;
    };
    let ttl = interceptor.policy.ttl_for(request.uri().path());

    match interceptor.lookup(&key) {
        Lookup::Hit(body) => {
            debug!(key = %key, "cache hit");
            hit_response(body, ttl)
        }
        Lookup::Miss => {
            let response = next.run(request).await;
            interceptor.capture(key, ttl, response).await
        }
    }
}

/// Replays a stored payload.
fn hit_response(body: Bytes, ttl: u64) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(X_CACHE, HIT);
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", ttl)) {
        headers.insert(CACHE_CONTROL, value);
    }
    response
}

/// Reads `body` frame by frame, stopping once more than `limit` bytes arrive.
async fn buffer_body(body: Body, limit: usize) -> Buffered {
    let mut frames = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut size = 0usize;

    while let Some(frame) = frames.next().await {
        let chunk = match frame {
            Ok(chunk) => chunk,
            Err(err) => return Buffered::Failed(err),
        };
        size = size.saturating_add(chunk.len());
        chunks.push(chunk);

        if size > limit {
            let read = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
            return Buffered::Overflow(Body::from_stream(read.chain(frames)));
        }
    }

    if chunks.len() == 1 {
        return Buffered::Complete(chunks.swap_remove(0));
    }
    let mut joined = BytesMut::with_capacity(size);
    for chunk in &chunks {
        joined.extend_from_slice(chunk);
    }
    Buffered::Complete(joined.freeze())
}

/// Reason a response must not be stored, judged from its head alone.
pub fn skip_reason(status: StatusCode, headers: &HeaderMap, max_body_bytes: usize) -> Option<SkipReason> {
    if status != StatusCode::OK {
        return Some(SkipReason::Status(status));
    }
    if !is_json(headers) {
        return Some(SkipReason::NotJson);
    }
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > max_body_bytes as u64) {
        return Some(SkipReason::TooLarge);
    }
    None
}

/// True for `application/json` and `+json` media types.
pub fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}
