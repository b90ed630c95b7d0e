//! Business services containing domain logic and use cases.

pub mod otp;

// Re-export commonly used types
pub use otp::{
    initialize_otp_service, otp_key, otp_service, rate_limit_key, CacheStoreTrait, DeliveryReport, KeyTtl, OtpService,
    OtpServiceConfig, OtpStats, RateLimitMode, SendOtpResult, SharedOtpService, SmsGatewayTrait,
};
