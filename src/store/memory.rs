//! In-memory cache store, the test stand-in for [`DiskStore`].

use crate::core::cache::{CacheInfo, CacheStore, StoredEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<StoredEntry> {
        let entries = self.inner.lock().await;
        let entry = entries.get(key).cloned();
        if entry.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        entry
    }

    async fn set(&self, key: &str, payload: serde_json::Value, ttl: Duration) {
        let mut entries = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        entries.insert(key.to_string(), StoredEntry::new(payload, ttl));
    }

    async fn invalidate(&self, key: &str) {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
    }

    async fn clear(&self) -> usize {
        let mut entries = self.inner.lock().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    async fn info(&self) -> CacheInfo {
        let entries = self.inner.lock().await;
        let total = entries.len();
        let valid = entries.values().filter(|entry| entry.is_valid()).count();
        let size_bytes: u64 = entries
            .values()
            .map(|entry| entry.payload.to_string().len() as u64)
            .sum();
        CacheInfo::from_counts(total, valid, size_bytes)
    }
}
