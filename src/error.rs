//! Error types for the cached HTTP client
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Body Error ==
/// Errors raised when reading a response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// The body was already read by someone else
    #[error("response body already consumed")]
    AlreadyConsumed,
}

// == Codec Error ==
/// Errors raised while encoding or decoding a cached response.
///
/// None of these are fatal: the store treats them as a skipped write or a miss.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The live body could not be captured
    #[error("cannot capture response body: {0}")]
    Body(#[from] BodyError),

    /// The payload ends before the header block is complete
    #[error("cached response is incomplete")]
    Incomplete,

    /// The payload is not an HTTP/1.x response
    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    /// Status code missing or out of range
    #[error("invalid status code: {0:?}")]
    InvalidStatus(Option<u16>),

    /// Header name or value rejected by the `http` crate
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Content-Length header is not a number
    #[error("invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Fewer body bytes than announced
    #[error("cached body truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
}

// == Config Error ==
/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Cache TTL must be a positive number of seconds
    #[error("cache TTL must be positive")]
    InvalidTtl,

    /// Client timeout must be positive
    #[error("timeout must be positive")]
    InvalidTimeout,

    /// Circuit breaker settings out of range
    #[error("invalid circuit breaker setting: {0}")]
    InvalidBreaker(&'static str),
}

// == Client Error ==
/// Errors surfaced by transports and the cached client.
///
/// The cache never produces these; they come from the network layer and are
/// propagated unchanged.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Error reported by reqwest (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The circuit breaker rejected the call
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Error reported by a custom transport
    #[error("transport error: {0}")]
    Transport(String),

    /// Client construction failed
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

// == API Error ==
/// Error type for the demo service handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Upstream call failed
    #[error("upstream request failed: {0}")]
    Upstream(#[from] ClientError),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Upstream body could not be read or parsed
    #[error("invalid upstream payload: {0}")]
    InvalidPayload(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the demo service handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
