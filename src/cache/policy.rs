//! Cacheability Policy

use http::{Method, StatusCode};

/// Returns true if a response to this method with this status may be stored.
///
/// Only `GET` and `HEAD` answered with `200 OK` qualify. Partial content and
/// every other status are rejected; cache-control headers are not inspected.
pub fn is_cacheable(method: &Method, status: StatusCode) -> bool {
    let method_cacheable = method == Method::GET || method == Method::HEAD;
    method_cacheable && status == StatusCode::OK
}
