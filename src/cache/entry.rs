//! Cache Entry Module
//!
//! Defines a single cached JSON payload with its expiration time.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::de::IgnoredAny;
use serde_json::Value;

// == JSON Payload ==
/// A well-formed JSON document kept as the exact bytes it was received in.
///
/// Replaying these bytes keeps key order, whitespace and number spelling
/// identical to the live response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPayload(Bytes);

impl JsonPayload {
    /// Wraps `bytes` once they parse as a single JSON document.
    pub fn from_bytes(bytes: Bytes) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<IgnoredAny>(&bytes)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Value> for JsonPayload {
    fn from(value: Value) -> Self {
        Self(Bytes::from(value.to_string()))
    }
}

// == Cache Entry ==
/// A cached payload and the instant it stops being visible.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub payload: JsonPayload,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now.
    pub fn new(payload: JsonPayload, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            payload,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Expiry check against an explicit clock reading.
    ///
    /// An entry is expired once the clock is greater than or equal to its
    /// expiration time, so a TTL of zero is never readable.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"symbol": "AAPL"}).into(), 60);

        assert_eq!(entry.payload.as_bytes().as_ref(), b"{\"symbol\":\"AAPL\"}");
        assert_eq!(entry.expires_at, entry.created_at + 60_000);
        assert!(!entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!(1).into(), 1);

        assert!(!entry.is_expired_at(current_timestamp_ms()));

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new(json!(null).into(), 0);
        assert!(entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            payload: json!("x").into(),
            created_at: now,
            expires_at: now,
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let entry = CacheEntry::new(json!(true).into(), u64::MAX);
        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_payload_keeps_bytes_verbatim() {
        let raw = Bytes::from_static(b"{ \"symbol\": \"AAPL\",  \"price\": 1.0e2 }\n");
        let payload = JsonPayload::from_bytes(raw.clone()).unwrap();

        assert_eq!(payload.as_bytes(), &raw);
        assert_eq!(payload.into_bytes(), raw);
    }

    #[test]
    fn test_payload_rejects_malformed_json() {
        assert!(JsonPayload::from_bytes(Bytes::from_static(b"{\"symbol\": ")).is_err());
        assert!(JsonPayload::from_bytes(Bytes::from_static(b"")).is_err());
        assert!(JsonPayload::from_bytes(Bytes::from_static(b"{} {}")).is_err());
        assert!(JsonPayload::from_bytes(Bytes::from_static(b"AAPL 187")).is_err());
    }
}
