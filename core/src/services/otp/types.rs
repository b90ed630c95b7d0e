//! Types for OTP service results

use serde::{Deserialize, Serialize};

/// Result of issuing an OTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOtpResult {
    /// The message ID from the delivery provider
    pub message_id: Option<String>,
    /// Minutes the issued code stays valid
    pub expires_in_minutes: u32,
    /// Seconds until another code may be requested
    pub resend_after_seconds: u64,
    /// The issued code; only present when code exposure is configured
    pub debug_code: Option<String>,
}

/// Read-only view of a phone number's OTP state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStats {
    /// An unexpired code is waiting to be verified
    pub has_pending_code: bool,
    /// No rate-limit marker blocks a new issuance
    pub can_issue_now: bool,
    /// Remaining cooldown when blocked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl OtpStats {
    /// Stats reported when the store cannot be read
    pub fn fail_open() -> Self {
        Self {
            has_pending_code: false,
            can_issue_now: true,
            retry_after_seconds: None,
        }
    }
}
