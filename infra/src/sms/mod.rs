//! SMS Gateway Module
//!
//! Delivery gateway implementations for the OTP service.
//!
//! ## Providers
//!
//! - **mock**: logs and records messages; used in development and tests
//! - **http**: POSTs messages to a configured HTTP endpoint

use std::sync::Arc;

use otp_core::SmsGatewayTrait;
use otp_shared::SmsConfig;

pub mod http_gateway;
pub mod mock_sms;

pub use http_gateway::{normalize_phone_number, HttpSmsGateway};
pub use mock_sms::{MockSmsGateway, SentMessage};

#[cfg(test)]
mod tests;

/// Create a delivery gateway based on configuration
///
/// Unknown providers, and an `http` provider that cannot be initialized, fall
/// back to the mock gateway with a warning.
pub fn create_sms_gateway(config: &SmsConfig) -> Arc<dyn SmsGatewayTrait> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsGateway::new()),
        "http" => match HttpSmsGateway::new(config) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                tracing::error!("Failed to initialize HTTP SMS gateway: {}", e);
                tracing::warn!("Falling back to mock SMS gateway");
                Arc::new(MockSmsGateway::new())
            }
        },
        other => {
            tracing::warn!(
                "Unknown SMS provider '{}', using mock implementation",
                other
            );
            Arc::new(MockSmsGateway::new())
        }
    }
}
