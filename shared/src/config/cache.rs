//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::parse_var;
use crate::errors::ConfigResult;

/// Where OTP records and rate-limit markers live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    /// Process-local store; records vanish on restart and are not shared between instances
    Memory,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            _ => Err(format!("Invalid cache backend: {}", s)),
        }
    }
}

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Store backend
    pub backend: CacheBackend,

    /// Redis connection URL
    pub url: String,

    /// Attempts for connecting and for each retriable command
    pub max_retries: u32,

    /// First backoff delay in milliseconds; doubles per attempt
    pub retry_delay_ms: u64,

    /// Backoff ceiling in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: String::from("redis://localhost:6379"),
            max_retries: 3,
            retry_delay_ms: 50,
            max_retry_delay_ms: 2000,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Read `CACHE_BACKEND`, `REDIS_URL` and the `REDIS_*` retry knobs
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            backend: parse_var(lookup, "CACHE_BACKEND")?.unwrap_or(defaults.backend),
            url: lookup("REDIS_URL").unwrap_or(defaults.url),
            max_retries: parse_var(lookup, "REDIS_MAX_RETRIES")?
                .unwrap_or(defaults.max_retries)
                .max(1),
            retry_delay_ms: parse_var(lookup, "REDIS_RETRY_DELAY_MS")?
                .unwrap_or(defaults.retry_delay_ms),
            max_retry_delay_ms: parse_var(lookup, "REDIS_MAX_RETRY_DELAY_MS")?
                .unwrap_or(defaults.max_retry_delay_ms),
        })
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}
