//! OTP error taxonomy
//!
//! Every failure the lifecycle manager can report maps to exactly one
//! [`OtpErrorKind`]. Transport code switches on the kind (or its stable
//! [`code`](OtpErrorKind::code)) and never on the display text.

use otp_shared::error_codes;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the OTP lifecycle manager and the service accessor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Invalid phone number format. Must be 10 digits starting with 6, 7, 8, or 9")]
    InvalidPhone,

    #[error("Invalid OTP format. Must be 6 digits")]
    InvalidCodeFormat,

    #[error("OTP already sent recently. Please wait before requesting another")]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("OTP expired or not found. Please request a new OTP")]
    NotFoundOrExpired,

    #[error("Invalid OTP. Please check and try again")]
    Mismatch,

    #[error("Failed to send OTP. Please try again later")]
    DeliveryFailed { reason: Option<String> },

    /// Store or gateway fault; `message` is for logs only
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("OTP service already initialized")]
    AlreadyInitialized,

    #[error("OTP service not initialized")]
    NotInitialized,

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

pub type OtpResult<T> = Result<T, OtpError>;

/// Payload-free discriminant of [`OtpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpErrorKind {
    InvalidPhone,
    InvalidCodeFormat,
    RateLimited,
    NotFoundOrExpired,
    Mismatch,
    DeliveryFailed,
    InternalError,
    AlreadyInitialized,
    NotInitialized,
    InvalidConfiguration,
}

impl OtpErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            OtpErrorKind::InvalidPhone => error_codes::INVALID_PHONE,
            OtpErrorKind::InvalidCodeFormat => error_codes::INVALID_CODE_FORMAT,
            OtpErrorKind::RateLimited => error_codes::RATE_LIMITED,
            OtpErrorKind::NotFoundOrExpired => error_codes::NOT_FOUND_OR_EXPIRED,
            OtpErrorKind::Mismatch => error_codes::MISMATCH,
            OtpErrorKind::DeliveryFailed => error_codes::DELIVERY_FAILED,
            OtpErrorKind::InternalError => error_codes::INTERNAL_ERROR,
            OtpErrorKind::AlreadyInitialized => error_codes::ALREADY_INITIALIZED,
            OtpErrorKind::NotInitialized => error_codes::NOT_INITIALIZED,
            OtpErrorKind::InvalidConfiguration => error_codes::INVALID_CONFIGURATION,
        }
    }
}

impl OtpError {
    /// Get the error kind
    pub fn kind(&self) -> OtpErrorKind {
        match self {
            OtpError::InvalidPhone => OtpErrorKind::InvalidPhone,
            OtpError::InvalidCodeFormat => OtpErrorKind::InvalidCodeFormat,
            OtpError::RateLimited { .. } => OtpErrorKind::RateLimited,
            OtpError::NotFoundOrExpired => OtpErrorKind::NotFoundOrExpired,
            OtpError::Mismatch => OtpErrorKind::Mismatch,
            OtpError::DeliveryFailed { .. } => OtpErrorKind::DeliveryFailed,
            OtpError::Internal { .. } => OtpErrorKind::InternalError,
            OtpError::AlreadyInitialized => OtpErrorKind::AlreadyInitialized,
            OtpError::NotInitialized => OtpErrorKind::NotInitialized,
            OtpError::InvalidConfiguration { .. } => OtpErrorKind::InvalidConfiguration,
        }
    }

    /// Message safe to hand to an end user
    ///
    /// Internal faults and programming errors collapse to a generic message so
    /// store or gateway details never leak through the transport.
    pub fn user_message(&self) -> String {
        match self {
            OtpError::Internal { .. }
            | OtpError::AlreadyInitialized
            | OtpError::NotInitialized
            | OtpError::InvalidConfiguration { .. } => {
                "Internal server error. Please try again later".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Seconds until a new request may succeed, when known
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            OtpError::RateLimited {
                retry_after_seconds,
            } => *retry_after_seconds,
            _ => None,
        }
    }
}
