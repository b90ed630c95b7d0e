//! OTP service module for phone-number verification
//!
//! This module provides the one-time passcode workflow:
//! - Code generation
//! - Issuance gated by a per-phone rate-limit marker
//! - Delivery with rollback when the gateway fails
//! - Single-use verification
//! - Status reporting and maintenance of the store

mod accessor;
mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use accessor::{initialize_otp_service, otp_service, SharedOtpService};
pub use config::{OtpServiceConfig, RateLimitMode};
pub use service::{otp_key, rate_limit_key, OtpService, OTP_KEY_PREFIX, RATE_LIMIT_KEY_PREFIX};
pub use traits::{CacheStoreTrait, DeliveryReport, KeyTtl, SmsGatewayTrait};
pub use types::{OtpStats, SendOtpResult};
