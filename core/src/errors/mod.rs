//! Domain-specific error types and error handling.

mod otp_error;


// Re-export all error types and utilities
pub use otp_error::{OtpError, OtpErrorKind, OtpResult};
