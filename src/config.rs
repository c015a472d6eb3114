//! Configuration Module
//!
//! Validated client settings, and the environment-driven settings of the demo
//! service.

use std::env;
use std::time::Duration;

use crate::client::BreakerConfig;
use crate::error::ConfigError;

/// Settings for a [`CachedClient`](crate::client::CachedClient).
///
/// Checked once at construction by [`ClientConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Timeout of every network call
    pub timeout: Duration,
    /// TTL in seconds of cached responses; `None` disables caching
    pub cache_ttl: Option<u64>,
    /// Circuit breaker around the transport; `None` disables it
    pub breaker: Option<BreakerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            cache_ttl: None,
            breaker: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.cache_ttl == Some(0) {
            return Err(ConfigError::InvalidTtl);
        }
        if let Some(breaker) = &self.breaker {
            breaker.validate()?;
        }
        Ok(())
    }
}

/// Demo service configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds of cached upstream responses
    pub cache_ttl: u64,
    /// Upstream call timeout in seconds
    pub client_timeout: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream API
    pub upstream_url: String,
    /// Expired-entry sweep interval in seconds, 0 disables the sweeper
    pub sweep_interval: u64,
    /// Failures before the breaker opens, 0 disables the breaker
    pub breaker_failure_threshold: u32,
    /// Seconds the breaker stays open
    pub breaker_open_timeout: u64,
    /// Trial successes needed to close the breaker
    pub breaker_success_threshold: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 60)
    /// - `CLIENT_TIMEOUT` - Upstream timeout in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: https://jsonplaceholder.typicode.com)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 0, disabled)
    /// - `BREAKER_FAILURE_THRESHOLD` - (default: 0, no breaker)
    /// - `BREAKER_OPEN_TIMEOUT` - (default: 30)
    /// - `BREAKER_SUCCESS_THRESHOLD` - (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            client_timeout: parse_var("CLIENT_TIMEOUT").unwrap_or(defaults.client_timeout),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            breaker_failure_threshold: parse_var("BREAKER_FAILURE_THRESHOLD")
                .unwrap_or(defaults.breaker_failure_threshold),
            breaker_open_timeout: parse_var("BREAKER_OPEN_TIMEOUT")
                .unwrap_or(defaults.breaker_open_timeout),
            breaker_success_threshold: parse_var("BREAKER_SUCCESS_THRESHOLD")
                .unwrap_or(defaults.breaker_success_threshold),
        }
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        let breaker = (self.breaker_failure_threshold > 0).then(|| BreakerConfig {
            failure_threshold: self.breaker_failure_threshold,
            open_timeout: chrono::Duration::seconds(
                i64::try_from(self.breaker_open_timeout)
                    .unwrap_or(i64::MAX)
                    .min(i64::MAX / 1000),
            ),
            success_threshold: self.breaker_success_threshold,
        });

        ClientConfig {
            timeout: Duration::from_secs(self.client_timeout),
            cache_ttl: Some(self.cache_ttl),
            breaker,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: 60,
            client_timeout: 60,
            server_port: 3000,
            upstream_url: "https://jsonplaceholder.typicode.com".to_string(),
            sweep_interval: 0,
            breaker_failure_threshold: 0,
            breaker_open_timeout: 30,
            breaker_success_threshold: 1,
        }
    }
}
