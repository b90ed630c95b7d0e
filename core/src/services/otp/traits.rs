//! Traits for store and delivery gateway integration

use async_trait::async_trait;

/// Remaining lifetime of a key as reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// Key exists and expires in the given number of seconds
    Expires(u64),
    /// Key exists without an expiry
    Persistent,
    /// Key does not exist
    Missing,
}

impl KeyTtl {
    /// Interpret a Redis-style TTL reply (`-1` no expiry, `-2` absent)
    pub fn from_seconds(raw: i64) -> Self {
        match raw {
            -1 => KeyTtl::Persistent,
            r if r < 0 => KeyTtl::Missing,
            r => KeyTtl::Expires(r as u64),
        }
    }

    /// Whether the key exists at all
    pub fn exists(&self) -> bool {
        !matches!(self, KeyTtl::Missing)
    }
}

/// Trait for the shared TTL key-value store
///
/// Each call must be atomic on its own; no cross-call transaction is assumed.
/// Errors are transport faults, rendered as strings for logging.
#[async_trait]
pub trait CacheStoreTrait: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>, String>;
    /// Write a value that expires after `ttl_seconds`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String>;
    /// Write a value only if the key is absent; returns whether it was written
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, String>;
    /// Delete a key; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool, String>;
    /// Check whether a key exists
    async fn exists(&self, key: &str) -> Result<bool, String>;
    /// Remaining lifetime of a key
    async fn ttl(&self, key: &str) -> Result<KeyTtl, String>;
    /// List keys starting with `prefix`
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, String>;
    /// Round trip to the backing server; in-process stores are always reachable
    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Outcome reported by a delivery gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub success: bool,
    /// Provider message identifier on success
    pub message_id: Option<String>,
    /// Provider reason code on failure
    pub error_code: Option<String>,
}

impl DeliveryReport {
    /// Successful delivery
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error_code: None,
        }
    }

    /// Rejected delivery with a reason code
    pub fn failed(error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error_code: Some(error_code.into()),
        }
    }
}

/// Trait for the text message delivery gateway
#[async_trait]
pub trait SmsGatewayTrait: Send + Sync {
    /// Send a message to a phone number
    ///
    /// `Ok` carries the provider's verdict (including rejections); `Err` is an
    /// unexpected fault of the gateway client itself.
    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReport, String>;

    /// Name of the provider for logs
    fn provider_name(&self) -> &str;
}
