//! Cache storage abstraction.
//!
//! Every fetcher goes through a [`CacheStore`] keyed by a source+parameter
//! signature. Entries carry their own fetch timestamp and TTL so validity is
//! derived, not stored; `get` returns expired entries too, because a fetcher
//! whose refetch failed may still serve stale data (with a warning) rather
//! than nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached payload together with its freshness metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub payload: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl StoredEntry {
    pub fn new(payload: serde_json::Value, ttl: Duration) -> Self {
        StoredEntry {
            payload,
            fetched_at: Utc::now(),
            ttl_secs: ttl.as_secs(),
        }
    }

    /// An entry is valid while `now - fetched_at < ttl`.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age < chrono::Duration::seconds(self.ttl_secs as i64)
    }
}

/// Aggregate state of the store, computable from entry metadata alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
    pub total_files: usize,
    pub valid_files: usize,
    pub expired_files: usize,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
}

impl CacheInfo {
    pub fn from_counts(total: usize, valid: usize, size_bytes: u64) -> Self {
        CacheInfo {
            total_files: total,
            valid_files: valid,
            expired_files: total - valid,
            total_size_bytes: size_bytes,
            total_size_mb: (size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        }
    }
}

/// Key/value persistence with TTL metadata.
///
/// Implementations must publish writes atomically: a concurrent reader sees
/// either the previous entry or the new one, never a torn write.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key` if one exists, valid or not. Damaged
    /// entries are reported as misses, never as errors.
    async fn get(&self, key: &str) -> Option<StoredEntry>;

    async fn set(&self, key: &str, payload: serde_json::Value, ttl: Duration);

    async fn invalidate(&self, key: &str);

    /// Removes every entry regardless of validity; returns how many were
    /// removed.
    async fn clear(&self) -> usize;

    async fn info(&self) -> CacheInfo;
}
