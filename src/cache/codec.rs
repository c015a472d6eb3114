//! Response Codec
//!
//! Serializes a full response into HTTP/1.x wire text and reads it back.
//! The bytes never leave the process; the wire format is just a convenient
//! self-contained representation.

use bytes::{BufMut, Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};

use crate::body::{Body, HttpRequest, HttpResponse};
use crate::error::CodecError;

/// Request a decoded response is bound to, stored in the response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginRequest {
    pub method: Method,
    pub uri: Uri,
}

// == Encode ==
/// Encodes status line, headers and body of `rsp`, the answer to a `method`
/// request.
///
/// The body is read once and a fresh view over the same bytes is put back
/// on `rsp`, so the caller can still read it exactly once.
///
/// Responses to `HEAD` keep their headers as received and carry no body.
/// Everything else gets a `Content-Length` matching the captured body.
///
/// # Errors
/// [`CodecError::Body`] if the live body was already consumed.
pub fn encode(rsp: &mut HttpResponse, method: &Method) -> Result<Bytes, CodecError> {
    let body = rsp.body_mut().read_all()?;
    *rsp.body_mut() = Body::from(body.clone());

    let head = method == Method::HEAD;
    let body = if head { Bytes::new() } else { body };

    let estimated_size = 128 + rsp.headers().len() * 64 + body.len();
    let mut buf = BytesMut::with_capacity(estimated_size);

    let version = match rsp.version() {
        Version::HTTP_10 => "HTTP/1.0",
        _ => "HTTP/1.1",
    };
    let status = rsp.status();
    buf.put(
        format!(
            "{} {} {}\r\n",
            version,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
        .as_bytes(),
    );

    for (name, value) in rsp.headers() {
        if name == TRANSFER_ENCODING || (name == CONTENT_LENGTH && !head) {
            continue;
        }
        put_header(&mut buf, name.as_str(), value.as_bytes());
    }
    if !head {
        put_header(&mut buf, CONTENT_LENGTH.as_str(), body.len().to_string().as_bytes());
    }

    buf.put_slice(b"\r\n");
    buf.put_slice(&body);

    Ok(buf.freeze())
}

fn put_header(buf: &mut BytesMut, name: &str, value: &[u8]) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value);
    buf.put_slice(b"\r\n");
}

// == Decode ==
/// Rebuilds a response from bytes produced by [`encode`], bound to `req`.
///
/// Responses to `HEAD` requests get an empty body whatever the payload holds.
/// The body is a zero-copy slice of `payload`.
///
/// # Errors
/// Any malformed or truncated payload yields a [`CodecError`]; callers treat
/// it as a cache miss.
pub fn decode(payload: &Bytes, req: &HttpRequest) -> Result<HttpResponse, CodecError> {
    let mut headers = vec![httparse::EMPTY_HEADER; header_capacity(payload)?];
    let mut raw = httparse::Response::new(&mut headers);

    let body_offset = match raw.parse(payload)? {
        httparse::Status::Complete(offset) => offset,
        httparse::Status::Partial => return Err(CodecError::Incomplete),
    };

    let status = raw
        .code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(CodecError::InvalidStatus(raw.code))?;

    let version = match raw.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut header_map = HeaderMap::with_capacity(raw.headers.len());
    for header in raw.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| CodecError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| CodecError::InvalidHeader(e.to_string()))?;
        header_map.append(name, value);
    }

    let remaining = payload.len() - body_offset;
    let body = if req.method() == Method::HEAD {
        Bytes::new()
    } else {
        match content_length(&header_map)? {
            Some(expected) if expected > remaining => {
                return Err(CodecError::Truncated {
                    expected,
                    actual: remaining,
                })
            }
            Some(expected) => payload.slice(body_offset..body_offset + expected),
            None => payload.slice(body_offset..),
        }
    };

    let mut rsp = http::Response::new(Body::from(body));
    *rsp.status_mut() = status;
    *rsp.version_mut() = version;
    *rsp.headers_mut() = header_map;
    rsp.extensions_mut().insert(OriginRequest {
        method: req.method().clone(),
        uri: req.uri().clone(),
    });

    Ok(rsp)
}

/// Upper bound on the header lines of `payload`: one per line break before
/// the blank line ending the head.
fn header_capacity(payload: &[u8]) -> Result<usize, CodecError> {
    let head_end = payload
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or(CodecError::Incomplete)?;
    Ok(payload[..head_end].iter().filter(|&&b| b == b'\n').count() + 1)
}

fn content_length(headers: &HeaderMap) -> Result<Option<usize>, CodecError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    let text = String::from_utf8_lossy(value.as_bytes());
    text.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| CodecError::InvalidContentLength(text.into_owned()))
}
