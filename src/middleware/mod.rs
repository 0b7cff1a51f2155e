//! Middleware Module
//!
//! The response-caching interceptor and the policy that drives it.

mod interceptor;
mod policy;

pub use interceptor::{
    cache_responses, is_json, skip_reason, Lookup, ResponseInterceptor, SkipReason, StoreOutcome,
    X_CACHE,
};
pub use policy::{
    default_ttl_rules, BypassReason, CachePolicy, Decision, TtlRule, DEFAULT_BYPASS_PREFIXES,
    DEFAULT_MAX_BODY_BYTES,
};
