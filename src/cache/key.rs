//! Request Keyer
//!
//! Derives cache keys from method and URL string.

use http::Method;

use crate::body::HttpRequest;

/// Builds the cache key for a method and URL string.
///
/// No normalization: trailing slashes, query order and case all take part
/// in the key as written.
pub fn request_key(method: &Method, url: &str) -> String {
    format!("{} {}", method, url)
}

/// Builds the cache key for a request. Headers and body are ignored.
pub fn key_for(req: &HttpRequest) -> String {
    request_key(req.method(), &req.uri().to_string())
}
