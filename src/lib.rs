//! Mini HTTP Cache - an HTTP client with an in-memory response cache
//!
//! Cacheable responses (`GET`/`HEAD` answered `200 OK`) are stored as HTTP/1.x
//! wire bytes for a fixed TTL and replayed with an `X-From-Cache: 1` marker.

pub mod api;
pub mod body;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use body::{Body, HttpRequest, HttpResponse};
pub use cache::{Cache, MemoryCache, XFROM_CACHE};
pub use client::CachedClient;
pub use config::{ClientConfig, Config};
pub use tasks::spawn_sweep_task;
