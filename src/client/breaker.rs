//! Circuit breaker for the network transport.
//!
//! Stops calling a failing upstream after repeated errors, lets a trial call
//! through once the open timeout has passed, and closes again after enough
//! trial successes.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::body::{HttpRequest, HttpResponse};
use crate::client::Transport;
use crate::error::{ClientError, ConfigError};

/// Configuration for the circuit breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call.
    pub open_timeout: Duration,
    /// Trial successes needed to close the circuit again.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::seconds(30),
            success_threshold: 1,
        }
    }
}

impl BreakerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::InvalidBreaker("failure threshold must be positive"));
        }
        if self.success_threshold == 0 {
            return Err(ConfigError::InvalidBreaker("success threshold must be positive"));
        }
        if self.open_timeout <= Duration::zero() {
            return Err(ConfigError::InvalidBreaker("open timeout must be positive"));
        }
        Ok(())
    }
}

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally.
    Closed,
    /// Requests are rejected.
    Open,
    /// Trial requests are let through.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<DateTime<Utc>>,
}

/// Thread-safe circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Current state, moving an expired open circuit to half-open.
    pub fn state(&self) -> CircuitState {
        self.state_at(Utc::now())
    }

    fn state_at(&self, now: DateTime<Utc>) -> CircuitState {
        let mut inner = self.lock();
        if inner.state == CircuitState::Open
            && inner
                .opened_at
                .is_some_and(|opened| now - opened >= self.config.open_timeout)
        {
            inner.state = CircuitState::HalfOpen;
            inner.half_open_successes = 0;
            info!("Circuit breaker half-open, allowing trial requests");
        }
        inner.state
    }

    /// Returns true if a call may proceed.
    pub fn allow(&self) -> bool {
        self.state() != CircuitState::Open
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        if inner.state == CircuitState::HalfOpen {
            inner.half_open_successes += 1;
            if inner.half_open_successes >= self.config.success_threshold {
                inner.state = CircuitState::Closed;
                inner.opened_at = None;
                info!("Circuit breaker closed");
            }
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        self.record_failure_at(Utc::now());
    }

    fn record_failure_at(&self, now: DateTime<Utc>) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;

        let should_open = match inner.state {
            CircuitState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            // Any failure in half-open reopens the circuit
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if should_open {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(now);
            inner.half_open_successes = 0;
            warn!(
                failures = inner.consecutive_failures,
                "Circuit breaker opened"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Transport that runs every call through a [`CircuitBreaker`].
///
/// Only transport errors count as failures; any HTTP status is a success
/// from the breaker's point of view.
#[derive(Debug)]
pub struct BreakerTransport<T> {
    inner: T,
    breaker: CircuitBreaker,
}

impl<T: Transport> BreakerTransport<T> {
    pub fn new(inner: T, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<T: Transport> Transport for BreakerTransport<T> {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        if !self.breaker.allow() {
            return Err(ClientError::CircuitOpen);
        }

        match self.inner.execute(req).await {
            Ok(rsp) => {
                self.breaker.record_success();
                Ok(rsp)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }
}
