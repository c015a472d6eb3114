//! Response DTOs for the demo service
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::models::Todo;

/// Response body for GET /todos/:id
#[derive(Debug, Clone, Serialize)]
pub struct TodoResponse {
    /// The upstream todo
    pub todo: Todo,
    /// Whether the upstream response was replayed from the cache
    pub cached: bool,
}

/// Response body for DELETE /cache/todos/:id
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The cache key that was dropped
    pub key: String,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Cache entry '{}' invalidated", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Raw counters
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// TTL applied to every entry, in seconds
    pub ttl_seconds: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a stats snapshot
    pub fn new(stats: StatsSnapshot, ttl_seconds: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_seconds,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_response_serialize() {
        let resp = TodoResponse {
            todo: Todo {
                user_id: 1,
                id: 2,
                title: "t".to_string(),
                completed: true,
            },
            cached: true,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"userId\":1"));
        assert!(json.contains("\"cached\":true"));
    }

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("GET http://upstream/todos/1");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("GET http://upstream/todos/1"));
        assert!(json.contains("invalidated"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = StatsSnapshot {
            hits: 8,
            misses: 2,
            total_entries: 5,
            ..StatsSnapshot::default()
        };
        let resp = StatsResponse::new(stats, 60);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);

        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 8);
        assert_eq!(json["total_entries"], 5);
        assert_eq!(json["ttl_seconds"], 60);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
