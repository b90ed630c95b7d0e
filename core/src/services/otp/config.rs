//! Configuration for the OTP service

use std::time::Duration;

use otp_shared::{Environment, OtpConfig};

use crate::errors::{OtpError, OtpResult};

/// Default minutes before an OTP expires
pub const DEFAULT_EXPIRY_MINUTES: u32 = 10;

/// Default seconds between issuances for one phone number
pub const DEFAULT_RATE_LIMIT_SECONDS: u64 = 60;

/// Default bound on a delivery gateway call
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// How the rate-limit marker is checked and written during issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitMode {
    /// Claim the marker with one set-if-absent call before generating a code.
    /// Two concurrent sends for one phone cannot both pass the gate.
    Atomic,
    /// Read the marker, then write code and marker. Concurrent sends for one
    /// phone may both pass the gate and both deliver.
    ReadThenWrite,
}

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of minutes before an OTP expires
    pub expiry_minutes: u32,
    /// Minimum seconds between issuances for one phone number
    pub rate_limit_seconds: u64,
    /// Bound on one delivery gateway call; elapsing counts as a delivery failure
    pub delivery_timeout: Duration,
    /// Include the issued code in the send result (non-production only)
    pub expose_code: bool,
    /// Marker write strategy
    pub rate_limit_mode: RateLimitMode,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            rate_limit_seconds: DEFAULT_RATE_LIMIT_SECONDS,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            expose_code: false,
            rate_limit_mode: RateLimitMode::Atomic,
        }
    }
}

impl OtpServiceConfig {
    /// Build the runtime configuration from loaded settings
    ///
    /// The environment is checked here so the debug-code switch is decided
    /// once, at configuration time.
    pub fn from_settings(settings: &OtpConfig, environment: Environment) -> OtpResult<Self> {
        settings
            .validate_for(environment)
            .map_err(|e| OtpError::InvalidConfiguration {
                message: e.to_string(),
            })?;

        let config = Self {
            expiry_minutes: settings.expiry_minutes,
            rate_limit_seconds: settings.rate_limit_seconds,
            delivery_timeout: Duration::from_secs(settings.delivery_timeout_seconds),
            expose_code: settings.expose_code,
            rate_limit_mode: if settings.atomic_rate_limit {
                RateLimitMode::Atomic
            } else {
                RateLimitMode::ReadThenWrite
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject non-positive durations
    pub fn validate(&self) -> OtpResult<()> {
        if self.expiry_minutes == 0 {
            return Err(OtpError::InvalidConfiguration {
                message: "expiry_minutes must be positive".to_string(),
            });
        }
        if self.rate_limit_seconds == 0 {
            return Err(OtpError::InvalidConfiguration {
                message: "rate_limit_seconds must be positive".to_string(),
            });
        }
        if self.delivery_timeout.is_zero() {
            return Err(OtpError::InvalidConfiguration {
                message: "delivery_timeout must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// OTP record lifetime in seconds
    pub fn expiry_seconds(&self) -> u64 {
        u64::from(self.expiry_minutes) * 60
    }
}
