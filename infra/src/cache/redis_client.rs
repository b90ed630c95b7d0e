//! Redis cache client implementation
//!
//! This module provides a Redis client with a multiplexed connection, retry
//! logic, and the key operations the OTP store needs: expiring writes,
//! set-if-absent claims, TTL inspection and prefix scans.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use otp_core::KeyTtl;
use otp_shared::phone::mask_phone_number;
use otp_shared::CacheConfig;

use crate::InfrastructureError;

/// Keys fetched per SCAN round trip
const SCAN_BATCH_SIZE: usize = 100;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Whether a command may run twice without changing its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Idempotency {
    /// Reads, SET EX, PING, SCAN
    Idempotent,
    /// SET NX and DEL: a lost reply after the server applied the command
    /// must not be retried, the second reply would misreport the outcome
    NonIdempotent,
}

/// Redis cache client with retry logic
///
/// Cloning is cheap; clones share the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Maximum number of attempts per operation
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
    /// Upper bound on the backoff delay
    max_retry_delay_ms: u64,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Connecting is retried with exponential backoff according to `config`.
    ///
    /// # Example
    /// ```no_run
    /// use otp_infra::cache::RedisClient;
    /// use otp_shared::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let client = RedisClient::new(&CacheConfig::new("redis://localhost:6379")).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = config.max_retries.max(1);
        let connection = Self::create_connection_with_retry(
            client,
            max_retries,
            config.retry_delay_ms,
            config.max_retry_delay_ms,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            max_retries,
            retry_delay_ms: config.retry_delay_ms,
            max_retry_delay_ms: config.max_retry_delay_ms,
        })
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        max_retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay, max_retry_delay_ms);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value with expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key = %mask_key(key), expiry_seconds, "Setting key");

        self.execute_with_retry(Idempotency::Idempotent, |mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(expiry_seconds)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(|e| log_failure("set", key, e))
    }

    /// Set a value with expiration time only if the key does not exist
    ///
    /// # Returns
    /// * `Ok(true)` - The key was written
    /// * `Ok(false)` - The key already existed and was left untouched
    pub async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        debug!(key = %mask_key(key), expiry_seconds, "Claiming key");

        let reply = self
            .execute_with_retry(Idempotency::NonIdempotent, |mut conn| {
                let key = key.to_string();
                let value = value.to_string();
                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("EX")
                        .arg(expiry_seconds)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| log_failure("set_nx", key, e))?;

        Ok(reply.is_some())
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!(key = %mask_key(key), "Getting key");

        self.execute_with_retry(Idempotency::Idempotent, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| log_failure("get", key, e))
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!(key = %mask_key(key), "Deleting key");

        let deleted = self
            .execute_with_retry(Idempotency::NonIdempotent, |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| log_failure("delete", key, e))?;

        Ok(deleted > 0)
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        self.execute_with_retry(Idempotency::Idempotent, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(|e| log_failure("exists", key, e))
    }

    /// Get time-to-live for a key
    pub async fn ttl(&self, key: &str) -> Result<KeyTtl, InfrastructureError> {
        let raw = self
            .execute_with_retry(Idempotency::Idempotent, |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await
            .map_err(|e| log_failure("ttl", key, e))?;

        Ok(KeyTtl::from_seconds(raw))
    }

    /// List all keys starting with `prefix`
    ///
    /// Walks the keyspace with SCAN so the server is never blocked the way
    /// KEYS would block it. Keys written during the walk may or may not appear.
    pub async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, InfrastructureError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch) = self
                .execute_with_retry(Idempotency::Idempotent, |mut conn| {
                    let pattern = pattern.clone();
                    Box::pin(async move {
                        redis::cmd("SCAN")
                            .arg(cursor)
                            .arg("MATCH")
                            .arg(pattern)
                            .arg("COUNT")
                            .arg(SCAN_BATCH_SIZE)
                            .query_async::<_, (u64, Vec<String>)>(&mut conn)
                            .await
                    })
                })
                .await
                .map_err(|e| log_failure("scan", prefix, e))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        debug!(prefix, count = keys.len(), "Scanned keys");
        Ok(keys)
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(Idempotency::Idempotent, |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation, retrying transient failures with exponential backoff
    ///
    /// Non-idempotent commands are only retried when the server refused them
    /// before execution; a dropped connection surfaces as an error instead.
    async fn execute_with_retry<F, T>(
        &self,
        idempotency: Idempotency,
        operation: F,
    ) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && should_retry(&e, idempotency) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay, self.max_retry_delay_ms);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn log_failure(operation: &str, key: &str, e: RedisError) -> InfrastructureError {
    error!(operation, key = %mask_key(key), error = %e, "Redis operation failed");
    InfrastructureError::Cache(e)
}

fn next_delay(delay: u64, cap: u64) -> u64 {
    delay.saturating_mul(2).min(cap)
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Retry decision for a failed attempt
///
/// An I/O error may arrive after the server already applied the command, so
/// it only counts as retriable for idempotent commands.
pub(crate) fn should_retry(error: &RedisError, idempotency: Idempotency) -> bool {
    match idempotency {
        Idempotency::Idempotent => is_retriable_error(error),
        Idempotency::NonIdempotent => matches!(
            error.kind(),
            redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
        ),
    }
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            if proto_end < at_pos {
                let proto = &url[..proto_end + 3];
                let host_part = &url[at_pos..];
                return format!("{}****{}", proto, host_part);
            }
        }
    }
    url.to_string()
}

/// Mask the phone number embedded in an OTP store key
pub(crate) fn mask_key(key: &str) -> String {
    match key.split_once(':') {
        Some((namespace, rest)) => format!("{}:{}", namespace, mask_phone_number(rest)),
        None => mask_phone_number(key),
    }
}

/// Escape glob metacharacters so a prefix matches literally in SCAN MATCH
pub(crate) fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
