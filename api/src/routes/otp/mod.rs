//! OTP route handlers
//!
//! - `POST /send` and `POST /resend`: issue a code
//! - `POST /verify`: check a code
//! - `GET /stats`: read-only status for a phone number

pub mod resend;
pub mod send;
pub mod stats;
pub mod verify;

use otp_core::SharedOtpService;

/// Application state that holds shared services
#[derive(Clone)]
pub struct AppState {
    pub otp_service: SharedOtpService,
}

impl AppState {
    pub fn new(otp_service: SharedOtpService) -> Self {
        Self { otp_service }
    }
}
