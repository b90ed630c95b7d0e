//! HTTP transport for the OTP service
//!
//! Library exports for the binary and for integration tests.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod routes;

pub use app::create_app;
pub use routes::otp::AppState;
