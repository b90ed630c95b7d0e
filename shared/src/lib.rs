//! Shared utilities and common types for the OTP service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error types and response structures
//! - Phone number and OTP code format checks

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, Environment, LogFormat, LoggingConfig, OtpConfig,
    ServerConfig, SmsApiMethod, SmsConfig,
};
pub use errors::{error_codes, ConfigError, ConfigResult};
pub use types::{ApiResponse, ErrorBody, HealthResponse, HealthStatus};
pub use utils::phone;
