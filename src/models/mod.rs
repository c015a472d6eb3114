//! Request and Response models for the demo service
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing upstream payloads and handler responses.

pub mod responses;
pub mod todo;

// Re-export commonly used types
pub use responses::{
    ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse, TodoResponse,
};
pub use todo::Todo;
