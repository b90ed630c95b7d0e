//! OTP issuance policy configuration

use serde::{Deserialize, Serialize};

use super::{parse_flag, parse_var, Environment};
use crate::errors::{ConfigError, ConfigResult};

/// OTP lifetime, cooldown and delivery settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minutes before an issued code expires
    pub expiry_minutes: u32,

    /// Seconds a phone number must wait between issuances
    pub rate_limit_seconds: u64,

    /// Upper bound on a single delivery gateway call
    pub delivery_timeout_seconds: u64,

    /// Return the issued code in API responses (never allowed in production)
    #[serde(default)]
    pub expose_code: bool,

    /// Claim the rate-limit marker with one SET NX EX instead of read-then-write
    #[serde(default = "default_atomic_rate_limit")]
    pub atomic_rate_limit: bool,

    /// Interval for the background sweep of TTL-less OTP keys; `None` disables it
    #[serde(default)]
    pub cleanup_interval_seconds: Option<u64>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expiry_minutes: 10,
            rate_limit_seconds: 60,
            delivery_timeout_seconds: 10,
            expose_code: false,
            atomic_rate_limit: default_atomic_rate_limit(),
            cleanup_interval_seconds: None,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Read `OTP_*` variables, keeping defaults for the ones that are unset
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            expiry_minutes: parse_var(lookup, "OTP_EXPIRY_MINUTES")?
                .unwrap_or(defaults.expiry_minutes),
            rate_limit_seconds: parse_var(lookup, "OTP_RATE_LIMIT_SECONDS")?
                .unwrap_or(defaults.rate_limit_seconds),
            delivery_timeout_seconds: parse_var(lookup, "OTP_DELIVERY_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.delivery_timeout_seconds),
            expose_code: parse_flag(lookup, "OTP_EXPOSE_CODE")?.unwrap_or(defaults.expose_code),
            atomic_rate_limit: parse_flag(lookup, "OTP_ATOMIC_RATE_LIMIT")?
                .unwrap_or(defaults.atomic_rate_limit),
            cleanup_interval_seconds: parse_var(lookup, "OTP_CLEANUP_INTERVAL_SECONDS")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero durations
    pub fn validate(&self) -> ConfigResult<()> {
        if self.expiry_minutes == 0 {
            return Err(ConfigError::Rule(
                "OTP_EXPIRY_MINUTES must be a positive integer".to_string(),
            ));
        }
        if self.rate_limit_seconds == 0 {
            return Err(ConfigError::Rule(
                "OTP_RATE_LIMIT_SECONDS must be a positive integer".to_string(),
            ));
        }
        if self.delivery_timeout_seconds == 0 {
            return Err(ConfigError::Rule(
                "OTP_DELIVERY_TIMEOUT_SECONDS must be a positive integer".to_string(),
            ));
        }
        if self.cleanup_interval_seconds == Some(0) {
            return Err(ConfigError::Rule(
                "OTP_CLEANUP_INTERVAL_SECONDS must be a positive integer when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Environment-dependent rules on top of `validate`
    pub fn validate_for(&self, environment: Environment) -> ConfigResult<()> {
        self.validate()?;
        if self.expose_code && environment.is_production() {
            return Err(ConfigError::Rule(
                "OTP_EXPOSE_CODE cannot be enabled in production".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_atomic_rate_limit() -> bool {
    true
}
