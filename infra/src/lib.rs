//! # Infrastructure Layer
//!
//! Concrete implementations of the OTP service's outbound ports.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client and an in-memory store, both usable as the OTP store
//! - **SMS**: HTTP gateway integration and a mock gateway for development

// Re-export core types for convenience
pub use otp_core::errors::*;

/// Cache module - Redis client and in-memory store
pub mod cache;

/// SMS gateway module - external delivery providers
pub mod sms;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
