//! Cache Key Module
//!
//! Derives stable, fixed-length cache keys from the shape of a request.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::cache::DEFAULT_NAMESPACE;

// == Cache Key ==
/// Opaque cache key: `<namespace>:<sha256 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Key Builder ==
/// Builds cache keys under a fixed namespace tag.
///
/// The namespace lets several logical caches share one physical store
/// without their keys colliding.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    namespace: String,
}

impl KeyBuilder {
    // == Constructor ==
    /// Creates a builder that prefixes every key with `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Returns the namespace tag.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Build Key ==
    /// Derives the key for `(method, path, query_params)`.
    ///
    /// Query parameters are sorted by `(name, value)` first, so the original
    /// submission order never affects the result.
    pub fn build_key(&self, method: &str, path: &str, query_params: &[(String, String)]) -> CacheKey {
        let mut sorted = query_params.to_vec();
        sorted.sort();

        // Debug output quotes and escapes each pair, keeping the string unambiguous
        let canonical = format!("{}:{}:{:?}", method, path, sorted);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hex::encode(hasher.finalize());

        CacheKey(format!("{}:{}", self.namespace, digest))
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Builds a key under the default namespace.
pub fn build_key(method: &str, path: &str, query_params: &[(String, String)]) -> CacheKey {
    KeyBuilder::default().build_key(method, path, query_params)
}
