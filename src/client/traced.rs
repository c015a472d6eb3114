//! Cached, instrumented HTTP client.

use std::sync::Arc;

use tracing::{debug, field, info_span, Instrument, Span};

use crate::body::{clone_request, HttpRequest, HttpResponse};
use crate::cache::{is_from_cache, Cache, MemoryCache};
use crate::client::{transport_from_config, Transport};
use crate::config::ClientConfig;
use crate::error::ClientError;

// == Cached Client ==
/// HTTP client that answers from a response cache when it can.
///
/// Each call runs inside an `http.client` tracing span. Network facts
/// (`status`, `error`) are only recorded for real exchanges; responses
/// replayed from the cache carry `X-From-Cache: 1` and leave those fields
/// empty.
///
/// Lookup and population are not atomic: concurrent misses on the same URL
/// each reach the network and the last write wins.
#[derive(Clone)]
pub struct CachedClient {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn Cache>>,
}

impl CachedClient {
    /// Creates a client over `transport`, caching through `cache` when set.
    pub fn new(transport: Arc<dyn Transport>, cache: Option<Arc<dyn Cache>>) -> Self {
        Self { transport, cache }
    }

    /// Builds the transport stack and, if a TTL is configured, an in-memory cache.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::build(config).map(|(client, _)| client)
    }

    /// Like [`CachedClient::from_config`], also handing back the concrete
    /// cache so its stats and maintenance methods stay reachable.
    pub fn build(config: &ClientConfig) -> Result<(Self, Option<Arc<MemoryCache>>), ClientError> {
        let transport = transport_from_config(config)?;
        let cache = config.cache_ttl.map(MemoryCache::new).transpose()?.map(Arc::new);
        let client = Self::new(
            transport,
            cache.clone().map(|cache| cache as Arc<dyn Cache>),
        );
        Ok((client, cache))
    }

    /// Returns the cache layer, if any.
    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    // == Execute ==
    /// Sends `req`, serving it from the cache when a fresh entry exists.
    ///
    /// Transport errors are returned unchanged and never cached.
    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let span = info_span!(
            "http.client",
            method = %req.method(),
            url = %req.uri(),
            status = field::Empty,
            error = field::Empty,
        );

        async move {
            let result = self.send(req).await;

            match &result {
                Ok(rsp) if is_from_cache(rsp) => debug!("Served from cache"),
                Ok(rsp) => {
                    Span::current().record("status", rsp.status().as_u16());
                }
                Err(err) => {
                    Span::current().record("error", true);
                    debug!(error = %err, "Request failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let Some(cache) = &self.cache else {
            return self.transport.execute(req).await;
        };

        if let Some(rsp) = cache.get(&req) {
            return Ok(rsp);
        }

        let probe = clone_request(&req);
        let mut rsp = self.transport.execute(req).await?;
        cache.set(&probe, &mut rsp);
        Ok(rsp)
    }
}

impl std::fmt::Debug for CachedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedClient")
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
