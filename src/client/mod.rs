//! Client Module
//!
//! The cached HTTP client and the network primitives it runs on.
//!
//! # Layers
//! - [`CachedClient`]: consults the cache, falls through to the transport on a miss
//! - [`BreakerTransport`]: optional circuit breaker around a transport
//! - [`ReqwestTransport`]: the real network call

mod breaker;
mod traced;
mod transport;

pub use breaker::{BreakerConfig, BreakerTransport, CircuitBreaker, CircuitState};
pub use traced::CachedClient;
pub use transport::{transport_from_config, ReqwestTransport, Transport};
