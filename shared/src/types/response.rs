//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

/// Machine-readable error code plus a message safe to show to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            timestamp: Utc::now(),
        }
    }

    /// Create a failed response that still carries data
    ///
    /// Used where the client needs the structured outcome (for example
    /// `issued: false`) alongside the error code.
    pub fn failure_with_data(data: T, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            ..Self::error(code, message)
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,

    /// Service name
    pub service: String,

    /// Server version
    pub version: String,

    /// Server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but the OTP store did not answer its health check
    Degraded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_omits_error() {
        let response = ApiResponse::success(42);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_response_carries_code() {
        let response: ApiResponse<()> = ApiResponse::error("RATE_LIMITED", "Please wait");
        assert!(!response.success);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_failure_with_data_keeps_both() {
        let response = ApiResponse::failure_with_data(false, "MISMATCH", "Invalid OTP");
        assert!(!response.success);
        assert_eq!(response.error.as_ref().unwrap().code, "MISMATCH");
        assert_eq!(response.data, Some(false));
    }
}
