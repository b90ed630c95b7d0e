//! In-process TTL store
//!
//! Expiry follows tokio's clock, so tests running with paused time can move
//! entries past their deadline with `tokio::time::advance`. Expired entries are
//! dropped lazily on access and by [`InMemoryStore::purge_expired`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use otp_core::{CacheStoreTrait, KeyTtl};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// Key-value store with per-key expiry, held in process memory
///
/// Each operation runs under one lock, so every call is atomic on its own.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value without expiry
    pub fn set_persistent(&self, key: &str, value: &str) {
        self.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|entry| entry.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry; returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    // No operation leaves the map half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
        let now = Instant::now();
        if matches!(entries.get(key), Some(entry) if !entry.is_live(now)) {
            entries.remove(key);
        }
        entries.get(key)
    }

    fn entry_with_ttl(value: &str, ttl_seconds: u64) -> Entry {
        Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
        }
    }
}

#[async_trait]
impl CacheStoreTrait for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key).map(|entry| entry.value.clone()))
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        self.lock()
            .insert(key.to_string(), Self::entry_with_ttl(value, ttl_seconds));
        Ok(())
    }

    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, String> {
        let mut entries = self.lock();
        if Self::live_entry(&mut entries, key).is_some() {
            return Ok(false);
        }
        entries.insert(key.to_string(), Self::entry_with_ttl(value, ttl_seconds));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        let mut entries = self.lock();
        let existed = Self::live_entry(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl, String> {
        let mut entries = self.lock();
        Ok(match Self::live_entry(&mut entries, key) {
            None => KeyTtl::Missing,
            Some(Entry { expires_at: None, .. }) => KeyTtl::Persistent,
            Some(Entry {
                expires_at: Some(deadline),
                ..
            }) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                // Round up so a live key never reports zero seconds left
                KeyTtl::Expires((remaining.as_millis() as u64).div_ceil(1000).max(1))
            }
        })
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, String> {
        let now = Instant::now();
        Ok(self
            .lock()
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
