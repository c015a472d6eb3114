//! Message Types
//!
//! Request/response aliases over the `http` crate and the read-once body
//! carried by every response the client hands out.

use bytes::Bytes;

use crate::error::BodyError;

/// Outbound request. The body is fully buffered.
pub type HttpRequest = http::Request<Bytes>;

/// Response returned by a transport or replayed from the cache.
pub type HttpResponse = http::Response<Body>;

// == Body ==
/// A fully buffered response body that can be read exactly once.
///
/// Reading hands out the underlying [`Bytes`]; any later read fails with
/// [`BodyError::AlreadyConsumed`]. Installing a new `Body` over a clone of
/// the same bytes gives an independent, unread view.
#[derive(Debug, Default)]
pub struct Body {
    data: Option<Bytes>,
}

impl Body {
    /// Creates an empty, unread body.
    pub fn empty() -> Self {
        Self {
            data: Some(Bytes::new()),
        }
    }

    /// Returns true once the body has been read.
    pub fn is_consumed(&self) -> bool {
        self.data.is_none()
    }

    /// Reads the whole body, leaving it consumed.
    pub fn read_all(&mut self) -> Result<Bytes, BodyError> {
        self.data.take().ok_or(BodyError::AlreadyConsumed)
    }

    /// Length of the unread body, or `None` if already consumed.
    pub fn len(&self) -> Option<usize> {
        self.data.as_ref().map(Bytes::len)
    }
}

impl From<Bytes> for Body {
    fn from(data: Bytes) -> Self {
        Self { data: Some(data) }
    }
}

impl From<Vec<u8>> for Body {
    fn from(data: Vec<u8>) -> Self {
        Bytes::from(data).into()
    }
}

impl From<String> for Body {
    fn from(data: String) -> Self {
        Bytes::from(data).into()
    }
}

impl From<&'static str> for Body {
    fn from(data: &'static str) -> Self {
        Bytes::from_static(data.as_bytes()).into()
    }
}

// == Request Cloning ==
/// Copies method, URI, version, headers and body of a request.
///
/// `http::Request` is not `Clone`; the body is a refcounted `Bytes` so the
/// copy is cheap.
pub fn clone_request(req: &HttpRequest) -> HttpRequest {
    let mut copy = http::Request::new(req.body().clone());
    *copy.method_mut() = req.method().clone();
    *copy.uri_mut() = req.uri().clone();
    *copy.version_mut() = req.version();
    *copy.headers_mut() = req.headers().clone();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_reads_once() {
        let mut body = Body::from("hello");

        assert_eq!(body.len(), Some(5));
        assert_eq!(body.read_all().unwrap(), Bytes::from_static(b"hello"));
        assert!(body.is_consumed());
        assert!(matches!(body.read_all(), Err(BodyError::AlreadyConsumed)));
        assert_eq!(body.len(), None);
    }

    #[test]
    fn test_default_body_is_consumed() {
        let body = Body::default();
        assert!(body.is_consumed());
        assert!(!Body::empty().is_consumed());
    }

    #[test]
    fn test_clone_request_copies_head_and_body() {
        let req = http::Request::builder()
            .method("POST")
            .uri("http://localhost/items?a=1")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let copy = clone_request(&req);
        assert_eq!(copy.method(), req.method());
        assert_eq!(copy.uri(), req.uri());
        assert_eq!(copy.headers(), req.headers());
        assert_eq!(copy.body(), req.body());
    }
}
