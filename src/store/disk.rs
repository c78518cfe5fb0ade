//! File-backed cache store: one JSON document per key.
//!
//! The layout is deliberately inspectable: each entry file carries its own
//! `fetched_at`/`ttl_secs` metadata, so validity and sizes can be computed by
//! reading the directory without touching any provider.

use crate::core::cache::{CacheInfo, CacheStore, StoredEntry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(DiskStore { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn is_entry_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "json")
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && Self::is_entry_file(path))
            .collect()
    }

    fn read_entry(path: &Path) -> Option<StoredEntry> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Cache read error for {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                // Damaged entries behave as misses; the next fetch overwrites
                // them.
                debug!("Corrupt cache entry at {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, key: &str) -> Option<StoredEntry> {
        let path = self.entry_path(key);
        if !path.exists() {
            debug!("Cache MISS for key: {}", key);
            return None;
        }
        let entry = Self::read_entry(&path);
        if entry.is_some() {
            debug!("Cache HIT for key: {}", key);
        }
        entry
    }

    async fn set(&self, key: &str, payload: serde_json::Value, ttl: Duration) {
        let entry = StoredEntry::new(payload, ttl);
        let path = self.entry_path(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));

        let res: Result<()> = (|| {
            let bytes = serde_json::to_vec(&entry)?;
            fs::write(&staging, bytes)?;
            // Publish atomically so readers never observe a partial entry.
            fs::rename(&staging, &path)?;
            Ok(())
        })();

        match res {
            Ok(()) => debug!("Cache PUT for key: {}", key),
            Err(e) => debug!("Cache write error for key {}: {}", key, e),
        }
    }

    async fn invalidate(&self, key: &str) {
        let path = self.entry_path(key);
        if let Err(e) = fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            debug!("Cache invalidate error for key {}: {}", key, e);
        }
    }

    async fn clear(&self) -> usize {
        let mut removed = 0;
        for path in self.entry_files() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => debug!("Error deleting {}: {}", path.display(), e),
            }
        }
        debug!("Cache CLEAR removed {} entries", removed);
        removed
    }

    async fn info(&self) -> CacheInfo {
        let mut total = 0;
        let mut valid = 0;
        let mut size_bytes = 0;
        for path in self.entry_files() {
            total += 1;
            if let Ok(meta) = fs::metadata(&path) {
                size_bytes += meta.len();
            }
            // Unreadable entries count as expired: they will never serve.
            if Self::read_entry(&path).is_some_and(|entry| entry.is_valid()) {
                valid += 1;
            }
        }
        CacheInfo::from_counts(total, valid, size_bytes)
    }
}
