//! API Handlers
//!
//! HTTP request handlers for the demo service.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Method;

use crate::body::HttpRequest;
use crate::cache::{is_from_cache, key_for, Cache, MemoryCache};
use crate::client::CachedClient;
use crate::config::Config;
use crate::error::{ApiError, ClientError, ConfigError, Result};
use crate::models::{HealthResponse, InvalidateResponse, StatsResponse, Todo, TodoResponse};

/// Application state shared across all handlers.
///
/// The client and the state share one cache instance, so invalidations and
/// stats see what the client stores.
#[derive(Clone)]
pub struct AppState {
    /// Cached upstream client
    pub client: CachedClient,
    /// The client's cache
    pub cache: Arc<MemoryCache>,
    /// Upstream base URL, without trailing slash
    pub upstream_url: String,
}

impl AppState {
    /// Creates a new AppState around an existing client and its cache.
    pub fn new(client: CachedClient, cache: Arc<MemoryCache>, upstream_url: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            upstream_url: upstream_url.into(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache and the transport stack described by the Config.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ClientError> {
        let (client, cache) = CachedClient::build(&config.client_config())?;
        let cache = cache.ok_or(ConfigError::InvalidTtl)?;

        Ok(Self::new(client, cache, config.upstream_url.clone()))
    }

    /// Upstream request for a todo item.
    fn todo_request(&self, id: u64) -> Result<HttpRequest> {
        http::Request::builder()
            .method(Method::GET)
            .uri(format!("{}/todos/{}", self.upstream_url, id))
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::new())
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }
}

/// Handler for GET /todos/:id
///
/// Fetches a todo from the upstream API through the cached client.
pub async fn todo_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TodoResponse>> {
    let req = state.todo_request(id)?;
    let mut rsp = state.client.execute(req).await?;

    if !rsp.status().is_success() {
        return Err(ApiError::UpstreamStatus(rsp.status().as_u16()));
    }

    let cached = is_from_cache(&rsp);
    let body = rsp
        .body_mut()
        .read_all()
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    let todo: Todo =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;

    Ok(Json(TodoResponse { todo, cached }))
}

/// Handler for DELETE /cache/todos/:id
///
/// Drops the cached upstream response for a todo, if any.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<InvalidateResponse>> {
    let req = state.todo_request(id)?;
    state.cache.delete(&req);

    Ok(Json(InvalidateResponse::new(key_for(&req))))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats(), state.cache.ttl()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
