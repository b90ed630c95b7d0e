//! Process-wide OTP service instance

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::errors::{OtpError, OtpResult};

use super::config::OtpServiceConfig;
use super::service::OtpService;
use super::traits::{CacheStoreTrait, SmsGatewayTrait};

/// Shared handle to the process-wide service
pub type SharedOtpService = Arc<OtpService<dyn SmsGatewayTrait, dyn CacheStoreTrait>>;

static OTP_SERVICE: OnceCell<SharedOtpService> = OnceCell::new();

/// Install the process-wide OTP service
///
/// Succeeds exactly once. Later calls return `AlreadyInitialized` and leave the
/// installed instance untouched, even if their configuration is invalid.
pub fn initialize_otp_service(
    sms_gateway: Arc<dyn SmsGatewayTrait>,
    cache_store: Arc<dyn CacheStoreTrait>,
    config: OtpServiceConfig,
) -> OtpResult<SharedOtpService> {
    if OTP_SERVICE.get().is_some() {
        return Err(OtpError::AlreadyInitialized);
    }

    let service = Arc::new(OtpService::new(sms_gateway, cache_store, config)?);

    OTP_SERVICE
        .set(service.clone())
        .map_err(|_| OtpError::AlreadyInitialized)?;

    tracing::info!(
        event = "otp_service_initialized",
        "OTP service initialized"
    );
    Ok(service)
}

/// The installed OTP service, or `NotInitialized`
pub fn otp_service() -> OtpResult<SharedOtpService> {
    OTP_SERVICE.get().cloned().ok_or(OtpError::NotInitialized)
}
