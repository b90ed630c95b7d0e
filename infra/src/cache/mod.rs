//! Cache module for the OTP store
//!
//! Provides the Redis-backed store used in deployments and an in-memory store
//! for local development and tests. Both implement `otp_core::CacheStoreTrait`.

pub mod memory_store;
pub mod redis_client;
mod redis_store_adapter;

#[cfg(test)]
mod tests;

pub use memory_store::InMemoryStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use otp_shared::{CacheBackend, CacheConfig};
