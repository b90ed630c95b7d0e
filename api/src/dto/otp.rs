use serde::{Deserialize, Serialize};
use validator::Validate;

use otp_core::SendOtpResult;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    /// 10-digit mobile number, e.g. "9876543210"
    #[serde(alias = "phone")]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(alias = "phone")]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,

    /// 6-digit code from the message
    #[serde(alias = "code")]
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpStatsQuery {
    #[serde(alias = "phone")]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub issued: bool,
    pub message: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub expires_in_minutes: u32,
    pub resend_after_seconds: u64,
    /// Issued code; only present when the server exposes codes for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl SendOtpResponse {
    pub fn new(message: &str, phone_number: String, result: SendOtpResult) -> Self {
        Self {
            issued: true,
            message: message.to_string(),
            phone_number,
            message_id: result.message_id,
            expires_in_minutes: result.expires_in_minutes,
            resend_after_seconds: result.resend_after_seconds,
            otp: result.debug_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub message: String,
    pub verified: bool,
}

/// `data` payload of a failed issue or verify request
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OtpFailure {
    Issue {
        issued: bool,
        reason: String,
        #[serde(rename = "retryAfterSeconds", skip_serializing_if = "Option::is_none")]
        retry_after_seconds: Option<u64>,
    },
    Verify {
        verified: bool,
        reason: String,
    },
}
