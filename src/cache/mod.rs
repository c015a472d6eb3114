//! Cache Module
//!
//! In-memory HTTP response caching with TTL expiration.
//!
//! Responses are keyed by `"<METHOD> <URL>"`, stored as HTTP/1.x wire bytes and
//! replayed with an `X-From-Cache: 1` marker header.

mod codec;
mod entry;
mod key;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use codec::{decode, encode, OriginRequest};
pub use entry::{current_timestamp, CacheEntry};
pub use key::{key_for, request_key};
pub use policy::is_cacheable;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::MemoryCache;

use crate::body::{HttpRequest, HttpResponse};

// == Public Constants ==
/// Marker header added to every response served from the cache
pub const XFROM_CACHE: &str = "x-from-cache";

/// Value of the marker header
pub const XFROM_CACHE_VALUE: &str = "1";

// == Cache Trait ==
/// Cache layer consulted by the client before every outbound call.
///
/// Implementations must be safe to share between concurrent callers and must
/// never fail the caller's request: write problems are swallowed and read
/// problems surface as misses.
pub trait Cache: Send + Sync {
    /// Returns a fresh cached response for the request, if any.
    fn get(&self, req: &HttpRequest) -> Option<HttpResponse>;

    /// Stores the response if the pair is cacheable.
    ///
    /// The live response body stays readable for the caller.
    fn set(&self, req: &HttpRequest, rsp: &mut HttpResponse);

    /// Drops the entry for the request, if present.
    fn delete(&self, req: &HttpRequest);
}

/// Returns true if the response was replayed from a cache.
pub fn is_from_cache(rsp: &HttpResponse) -> bool {
    rsp.headers()
        .get(XFROM_CACHE)
        .is_some_and(|v| v == XFROM_CACHE_VALUE)
}
