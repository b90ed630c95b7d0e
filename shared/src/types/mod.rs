//! Type definitions shared by the transport layer
//!
//! - `response` - API response wrappers and health checks

pub mod response;

pub use response::{ApiResponse, ErrorBody, HealthResponse, HealthStatus};
