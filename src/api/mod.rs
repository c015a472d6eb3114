//! API Module
//!
//! HTTP handlers and routing for the demo service, which proxies a todo API
//! through the cached client.
//!
//! # Endpoints
//! - `GET /todos/:id` - Fetch a todo (cached)
//! - `DELETE /cache/todos/:id` - Invalidate a cached todo
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
