//! Main OTP service implementation

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use std::fmt::Display;
use std::sync::Arc;

use otp_shared::phone::{mask_phone_number, validate_code_format, validate_phone};

use crate::errors::{OtpError, OtpResult};

use super::config::{OtpServiceConfig, RateLimitMode};
use super::traits::{CacheStoreTrait, KeyTtl, SmsGatewayTrait};
use super::types::{OtpStats, SendOtpResult};

/// Key namespace for OTP records
pub const OTP_KEY_PREFIX: &str = "otp:";

/// Key namespace for rate-limit markers
pub const RATE_LIMIT_KEY_PREFIX: &str = "recent_otp:";

const RATE_LIMIT_MARKER: &str = "1";

/// Store key of the OTP record for a phone number
pub fn otp_key(phone: &str) -> String {
    format!("{}{}", OTP_KEY_PREFIX, phone)
}

/// Store key of the rate-limit marker for a phone number
pub fn rate_limit_key(phone: &str) -> String {
    format!("{}{}", RATE_LIMIT_KEY_PREFIX, phone)
}

/// OTP lifecycle manager
///
/// Holds no per-phone state of its own: every decision is made against the
/// store, so any number of instances can share one store.
pub struct OtpService<S: SmsGatewayTrait + ?Sized, C: CacheStoreTrait + ?Sized> {
    /// Delivery gateway for outgoing messages
    sms_gateway: Arc<S>,
    /// Store holding OTP records and rate-limit markers
    cache_store: Arc<C>,
    /// Service configuration
    config: OtpServiceConfig,
}

impl<S, C> OtpService<S, C>
where
    S: SmsGatewayTrait + ?Sized,
    C: CacheStoreTrait + ?Sized,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `sms_gateway` - Delivery gateway implementation
    /// * `cache_store` - Store implementation
    /// * `config` - Service configuration; rejected if any duration is zero
    pub fn new(
        sms_gateway: Arc<S>,
        cache_store: Arc<C>,
        config: OtpServiceConfig,
    ) -> OtpResult<Self> {
        config.validate()?;
        Ok(Self {
            sms_gateway,
            cache_store,
            config,
        })
    }

    /// Service configuration
    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Whether the store answers a health check
    pub async fn store_available(&self) -> bool {
        match self.cache_store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    event = "store_unavailable",
                    "OTP store health check failed"
                );
                false
            }
        }
    }

    /// Generate a 6-digit code uniformly from 100000..=999999 using the OS CSPRNG
    pub fn generate_code() -> String {
        OsRng.gen_range(100_000u32..=999_999).to_string()
    }

    /// Issue an OTP to a phone number
    ///
    /// This method:
    /// 1. Validates the phone number format
    /// 2. Passes the rate-limit gate (see [`RateLimitMode`])
    /// 3. Generates a code and stores it with the configured expiry
    /// 4. Sends the code through the delivery gateway
    /// 5. Removes both records again if delivery does not succeed
    ///
    /// # Returns
    ///
    /// * `Ok(SendOtpResult)` - The code was delivered
    /// * `Err(OtpError)` - `InvalidPhone`, `RateLimited`, `DeliveryFailed` or `Internal`
    pub async fn send_otp(&self, phone: &str) -> OtpResult<SendOtpResult> {
        if !validate_phone(phone) {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                event = "invalid_phone",
                "Rejected OTP request with invalid phone number"
            );
            return Err(OtpError::InvalidPhone);
        }

        let code_key = otp_key(phone);
        let marker_key = rate_limit_key(phone);

        match self.config.rate_limit_mode {
            RateLimitMode::Atomic => {
                let claimed = self
                    .cache_store
                    .set_if_absent_with_expiry(
                        &marker_key,
                        RATE_LIMIT_MARKER,
                        self.config.rate_limit_seconds,
                    )
                    .await
                    .map_err(|e| self.internal("send_otp", phone, e))?;
                if !claimed {
                    return Err(self.rate_limited(phone, &marker_key).await);
                }
            }
            RateLimitMode::ReadThenWrite => {
                let marker = self
                    .cache_store
                    .get(&marker_key)
                    .await
                    .map_err(|e| self.internal("send_otp", phone, e))?;
                if marker.is_some() {
                    return Err(self.rate_limited(phone, &marker_key).await);
                }
            }
        }

        let code = Self::generate_code();

        if let Err(e) = self.store_records(&code_key, &marker_key, &code).await {
            self.rollback(phone).await;
            return Err(self.internal("send_otp", phone, e));
        }

        let message = format!(
            "Your OTP is {}. Valid for {} minutes.",
            code, self.config.expiry_minutes
        );

        let outcome = tokio::time::timeout(
            self.config.delivery_timeout,
            self.sms_gateway.send(phone, &message),
        )
        .await;

        let report = match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                self.rollback(phone).await;
                return Err(self.internal(
                    "send_otp",
                    phone,
                    format!("{} gateway error: {}", self.sms_gateway.provider_name(), e),
                ));
            }
            Err(_) => {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    provider = self.sms_gateway.provider_name(),
                    timeout_ms = self.config.delivery_timeout.as_millis() as u64,
                    event = "otp_delivery_timeout",
                    "OTP delivery timed out"
                );
                self.rollback(phone).await;
                return Err(OtpError::DeliveryFailed {
                    reason: Some("TIMEOUT".to_string()),
                });
            }
        };

        if !report.success {
            tracing::error!(
                phone = %mask_phone_number(phone),
                provider = self.sms_gateway.provider_name(),
                error_code = ?report.error_code,
                event = "otp_delivery_failed",
                "OTP delivery rejected by gateway"
            );
            self.rollback(phone).await;
            return Err(OtpError::DeliveryFailed {
                reason: report.error_code,
            });
        }

        tracing::info!(
            phone = %mask_phone_number(phone),
            provider = self.sms_gateway.provider_name(),
            message_id = ?report.message_id,
            event = "otp_sent",
            "OTP sent successfully"
        );

        Ok(SendOtpResult {
            message_id: report.message_id,
            expires_in_minutes: self.config.expiry_minutes,
            resend_after_seconds: self.config.rate_limit_seconds,
            debug_code: self.config.expose_code.then_some(code),
        })
    }

    /// Issue a new OTP; same contract and same rate-limit gate as [`send_otp`](Self::send_otp)
    pub async fn resend_otp(&self, phone: &str) -> OtpResult<SendOtpResult> {
        self.send_otp(phone).await
    }

    /// Verify a code for a phone number
    ///
    /// A wrong code leaves the record in place so the user can retry until it
    /// expires. A correct code consumes the record and clears the rate-limit
    /// marker, so a new code can be requested immediately.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The code matched and has been consumed
    /// * `Err(OtpError)` - `InvalidPhone`, `InvalidCodeFormat`, `NotFoundOrExpired`,
    ///   `Mismatch` or `Internal`
    pub async fn verify_otp(&self, phone: &str, code: &str) -> OtpResult<()> {
        if !validate_phone(phone) {
            return Err(OtpError::InvalidPhone);
        }
        if !validate_code_format(code) {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                code_length = code.len(),
                event = "invalid_code_format",
                "Invalid OTP format provided"
            );
            return Err(OtpError::InvalidCodeFormat);
        }

        let code_key = otp_key(phone);
        let stored = self
            .cache_store
            .get(&code_key)
            .await
            .map_err(|e| self.internal("verify_otp", phone, e))?;

        let Some(stored) = stored else {
            tracing::info!(
                phone = %mask_phone_number(phone),
                event = "otp_not_found",
                "No pending OTP for phone number"
            );
            return Err(OtpError::NotFoundOrExpired);
        };

        if !Self::constant_time_compare(&stored, code) {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                event = "otp_verification_failed",
                "OTP mismatch"
            );
            return Err(OtpError::Mismatch);
        }

        let consumed = self
            .cache_store
            .delete(&code_key)
            .await
            .map_err(|e| self.internal("verify_otp", phone, e))?;
        if !consumed {
            // Expired or consumed by a concurrent verification since the read.
            tracing::warn!(
                phone = %mask_phone_number(phone),
                event = "otp_consumed_concurrently",
                "OTP disappeared between read and delete"
            );
            return Err(OtpError::NotFoundOrExpired);
        }

        if let Err(e) = self.cache_store.delete(&rate_limit_key(phone)).await {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                error = %e,
                event = "rate_limit_clear_failed",
                "Failed to clear rate-limit marker after verification"
            );
        }

        tracing::info!(
            phone = %mask_phone_number(phone),
            event = "otp_verified_success",
            "OTP verified successfully"
        );
        Ok(())
    }

    /// Delete OTP records that carry no expiry
    ///
    /// The store's own expiry is authoritative; this only catches records
    /// written without a TTL. Records with a TTL are never touched. Errors are
    /// logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of records removed
    pub async fn cleanup_expired_otps(&self) -> usize {
        let keys = match self.cache_store.scan_prefix(OTP_KEY_PREFIX).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event = "otp_cleanup_failed",
                    "Error scanning OTP keys for cleanup"
                );
                return 0;
            }
        };

        let mut cleaned = 0;
        for key in keys {
            match self.cache_store.ttl(&key).await {
                Ok(KeyTtl::Persistent) => match self.cache_store.delete(&key).await {
                    Ok(true) => cleaned += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            event = "otp_cleanup_failed",
                            "Error deleting OTP key without expiry"
                        );
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event = "otp_cleanup_failed",
                        "Error reading TTL during cleanup"
                    );
                }
            }
        }

        if cleaned > 0 {
            tracing::info!(
                cleaned,
                event = "otp_cleanup",
                "Cleaned up OTP keys without expiry"
            );
        }
        cleaned
    }

    /// Get OTP statistics for a phone number
    ///
    /// Read-only. If the store cannot be read, reports "no pending code, can
    /// request" rather than blocking the user.
    pub async fn get_otp_stats(&self, phone: &str) -> OtpStats {
        match self.read_stats(phone).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(
                    operation = "get_otp_stats",
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "otp_internal_error",
                    "Error getting OTP stats; failing open"
                );
                OtpStats::fail_open()
            }
        }
    }

    async fn read_stats(&self, phone: &str) -> Result<OtpStats, String> {
        let code_key = otp_key(phone);
        let marker_key = rate_limit_key(phone);

        let (has_code, marker_ttl) = tokio::try_join!(
            self.cache_store.exists(&code_key),
            self.cache_store.ttl(&marker_key),
        )?;

        let retry_after_seconds = match marker_ttl {
            KeyTtl::Expires(seconds) if seconds > 0 => Some(seconds),
            _ => None,
        };

        Ok(OtpStats {
            has_pending_code: has_code,
            can_issue_now: !marker_ttl.exists(),
            retry_after_seconds,
        })
    }

    async fn store_records(&self, code_key: &str, marker_key: &str, code: &str) -> Result<(), String> {
        self.cache_store
            .set_with_expiry(code_key, code, self.config.expiry_seconds())
            .await?;

        if self.config.rate_limit_mode == RateLimitMode::ReadThenWrite {
            self.cache_store
                .set_with_expiry(marker_key, RATE_LIMIT_MARKER, self.config.rate_limit_seconds)
                .await?;
        }
        Ok(())
    }

    /// Remove the OTP record and the rate-limit marker, each independently
    async fn rollback(&self, phone: &str) {
        let records = [
            ("otp_record", otp_key(phone)),
            ("rate_limit_marker", rate_limit_key(phone)),
        ];
        for (record, key) in records {
            if let Err(e) = self.cache_store.delete(&key).await {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    record,
                    error = %e,
                    event = "otp_rollback_failed",
                    "Failed to remove record during rollback"
                );
            }
        }
        tracing::info!(
            phone = %mask_phone_number(phone),
            event = "otp_rolled_back",
            "Rolled back OTP issuance"
        );
    }

    async fn rate_limited(&self, phone: &str, marker_key: &str) -> OtpError {
        let retry_after_seconds = match self.cache_store.ttl(marker_key).await {
            Ok(KeyTtl::Expires(seconds)) if seconds > 0 => Some(seconds),
            _ => None,
        };
        tracing::warn!(
            phone = %mask_phone_number(phone),
            retry_after_seconds = ?retry_after_seconds,
            event = "rate_limit_exceeded",
            "OTP requested during cooldown"
        );
        OtpError::RateLimited {
            retry_after_seconds,
        }
    }

    fn internal(&self, operation: &'static str, phone: &str, error: impl Display) -> OtpError {
        tracing::error!(
            operation,
            phone = %mask_phone_number(phone),
            error = %error,
            event = "otp_internal_error",
            "OTP operation failed"
        );
        OtpError::Internal {
            message: format!("{} failed: {}", operation, error),
        }
    }

    fn constant_time_compare(stored: &str, provided: &str) -> bool {
        if stored.len() != provided.len() {
            return false;
        }
        constant_time_eq(stored.as_bytes(), provided.as_bytes())
    }
}
