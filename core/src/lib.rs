//! # OTP Core
//!
//! Core business logic for phone-number one-time passcodes.
//! This crate contains the OTP lifecycle manager, the store and delivery
//! gateway ports it depends on, the process-wide service accessor and the
//! error taxonomy shared with the transport layer.

pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use errors::*;
pub use services::*;
