//! Network Transport
//!
//! The primitive the cached client falls through to on a miss.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::body::{Body, HttpRequest, HttpResponse};
use crate::client::{BreakerTransport, CircuitBreaker};
use crate::config::ClientConfig;
use crate::error::ClientError;

// == Transport Trait ==
/// Executes a request against the network.
///
/// Implementations return the full response with its body buffered. Errors
/// are passed through the cache layer untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).execute(req).await
    }
}

// == Reqwest Transport ==
/// Transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let req = reqwest::Request::try_from(req)?;
        let rsp = self.client.execute(req).await?;

        let status = rsp.status();
        let version = rsp.version();
        let headers = rsp.headers().clone();
        let body = rsp.bytes().await?;

        let mut out = http::Response::new(Body::from(body));
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

/// Builds the network stack described by `config`: reqwest with the
/// configured timeout, wrapped in a circuit breaker when one is set.
pub fn transport_from_config(config: &ClientConfig) -> Result<Arc<dyn Transport>, ClientError> {
    config.validate()?;
    let transport = ReqwestTransport::new(config.timeout)?;

    Ok(match &config.breaker {
        Some(breaker) => Arc::new(BreakerTransport::new(
            transport,
            CircuitBreaker::new(breaker.clone()),
        )),
        None => Arc::new(transport),
    })
}
