//! Adapter exposing `RedisClient` as the OTP service's store

use async_trait::async_trait;

use otp_core::{CacheStoreTrait, KeyTtl};

use super::redis_client::RedisClient;

#[async_trait]
impl CacheStoreTrait for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        RedisClient::get(self, key).await.map_err(|e| e.to_string())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        RedisClient::set_with_expiry(self, key, value, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, String> {
        RedisClient::set_if_absent_with_expiry(self, key, value, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        RedisClient::delete(self, key).await.map_err(|e| e.to_string())
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        RedisClient::exists(self, key).await.map_err(|e| e.to_string())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl, String> {
        RedisClient::ttl(self, key).await.map_err(|e| e.to_string())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, String> {
        RedisClient::scan_prefix(self, prefix)
            .await
            .map_err(|e| e.to_string())
    }

    async fn ping(&self) -> Result<(), String> {
        match self.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("Unexpected PING reply".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}
