//! Configuration module with service-specific sub-modules
//!
//! - `cache` - OTP store backend and Redis connection settings
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Expiry, cooldown and delivery policy for OTP issuance
//! - `server` - HTTP server binding
//! - `sms` - Delivery gateway provider settings
//!
//! Every loader has a `from_env()` entry point and a `from_lookup()` variant
//! that takes the variable source as a closure, which keeps tests away from
//! the process environment.

pub mod cache;
pub mod environment;
pub mod otp;
pub mod server;
pub mod sms;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ConfigError, ConfigResult};

// Re-export commonly used types
pub use cache::{CacheBackend, CacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use server::ServerConfig;
pub use sms::{SmsApiMethod, SmsConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// OTP store configuration
    pub cache: CacheConfig,

    /// OTP policy configuration
    pub otp: OtpConfig,

    /// Delivery gateway configuration
    pub sms: SmsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);
        let otp = OtpConfig::from_lookup(&lookup)?;
        otp.validate_for(environment)?;

        Ok(Self {
            environment,
            server: ServerConfig::from_lookup(&lookup)?,
            cache: CacheConfig::from_lookup(&lookup)?,
            otp,
            sms: SmsConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup, environment),
        })
    }
}

/// Parse an optional variable, reporting malformed values instead of defaulting
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            trimmed
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        }
    }
}

/// Parse a boolean flag; accepts true/false, 1/0, yes/no, on/off
pub(crate) fn parse_flag<F>(lookup: &F, key: &str) -> ConfigResult<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
