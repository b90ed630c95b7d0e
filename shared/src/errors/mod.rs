//! Shared error types and error codes

use thiserror::Error;

/// Errors raised while loading configuration from the environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A value parsed but violates a configuration rule
    #[error("Invalid configuration: {0}")]
    Rule(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Common error codes used across the application
pub mod error_codes {
    pub const INVALID_PHONE: &str = "INVALID_PHONE";
    pub const INVALID_CODE_FORMAT: &str = "INVALID_CODE_FORMAT";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const NOT_FOUND_OR_EXPIRED: &str = "NOT_FOUND_OR_EXPIRED";
    pub const MISMATCH: &str = "MISMATCH";
    pub const DELIVERY_FAILED: &str = "DELIVERY_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const ALREADY_INITIALIZED: &str = "ALREADY_INITIALIZED";
    pub const NOT_INITIALIZED: &str = "NOT_INITIALIZED";
    pub const INVALID_CONFIGURATION: &str = "INVALID_CONFIGURATION";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: "OTP_EXPIRY_MINUTES".to_string(),
            value: "-5".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("OTP_EXPIRY_MINUTES"));
        assert!(text.contains("\"-5\""));
    }
}
