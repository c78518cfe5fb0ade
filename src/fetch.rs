//! Cached source fetching.
//!
//! Each external provider implements [`RemoteSource`]; a [`SourceFetcher`]
//! wraps it with the cache-first/degrade-gracefully behavior every source
//! shares: TTL-checked cache consultation, a single bounded retry, a
//! per-source timeout, stale fallback when the provider is down, and a
//! [`SourceStatus`] describing how the data was obtained. Fetchers never
//! return errors; failure is always absent data plus a degraded status.

use crate::core::cache::{CacheStore, StoredEntry};
use crate::core::status::{Source, SourceStatus};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Upper bound on one remote request, applied per source so a hung provider
/// cannot stall the others.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Classified remote failure. Absorbed into [`SourceStatus`] by the fetcher,
/// never propagated to scoring callers.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One external data provider.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    type Payload: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

    fn source(&self) -> Source;

    /// Uniquely identifies this source+parameter combination in the cache.
    fn cache_key(&self) -> String;

    /// Note reported when the source works but runs with degraded
    /// credentials (e.g. an unauthenticated rate-limited tier).
    fn credential_warning(&self) -> Option<String> {
        None
    }

    async fn pull(&self) -> Result<Self::Payload, FetchError>;
}

/// Result of a fetch: the payload when any usable data exists (fresh, cached
/// or stale), and the status describing how healthy the source is.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub data: Option<T>,
    pub status: SourceStatus,
}

pub struct SourceFetcher<T> {
    remote: Arc<dyn RemoteSource<Payload = T>>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    timeout: Duration,
    gate: Mutex<()>,
}

impl<T> SourceFetcher<T>
where
    T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    pub fn new(
        remote: Arc<dyn RemoteSource<Payload = T>>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        SourceFetcher {
            remote,
            cache,
            ttl,
            timeout: REQUEST_TIMEOUT,
            gate: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> Source {
        self.remote.source()
    }

    /// Cache-first fetch. With `refresh` the cache validity window is
    /// ignored and the provider is re-hit (unless a concurrent caller
    /// already refreshed the key while this one waited on the gate).
    pub async fn fetch(&self, refresh: bool) -> FetchOutcome<T> {
        let requested_at = Utc::now();
        // At most one remote pull in flight per cache key; waiters re-check
        // the cache once the first caller has populated it.
        let _guard = self.gate.lock().await;

        let key = self.remote.cache_key();
        let cached = self.cache.get(&key).await;

        if let Some(entry) = &cached {
            let satisfied = if refresh {
                entry.fetched_at >= requested_at
            } else {
                entry.is_valid()
            };
            if satisfied && let Some(data) = self.decode(entry) {
                return FetchOutcome {
                    data: Some(data),
                    status: self.healthy_status(),
                };
            }
        }

        match self.pull_remote(key).await {
            Ok(data) => FetchOutcome {
                data: Some(data),
                status: self.healthy_status(),
            },
            Err(err) => self.degraded(cached, err),
        }
    }

    fn healthy_status(&self) -> SourceStatus {
        match self.remote.credential_warning() {
            Some(note) => SourceStatus::warning(self.remote.source(), note),
            None => SourceStatus::ok(self.remote.source()),
        }
    }

    fn decode(&self, entry: &StoredEntry) -> Option<T> {
        match serde_json::from_value(entry.payload.clone()) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(
                    "Discarding undecodable cache entry for {}: {}",
                    self.remote.source(),
                    e
                );
                None
            }
        }
    }

    /// Pulls the provider on a detached task so a cancelled scoring request
    /// cannot abort the request mid-flight; the task writes the cache itself
    /// and later requests benefit even if this caller went away.
    async fn pull_remote(&self, key: String) -> Result<T, FetchError> {
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);
        let ttl = self.ttl;
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let mut result = pull_once(remote.as_ref(), timeout).await;
            if let Err(err) = &result
                && !matches!(err, FetchError::MissingCredential(_))
            {
                debug!("Pull failed for {}: {}. Retrying once", key, err);
                tokio::time::sleep(RETRY_DELAY).await;
                result = pull_once(remote.as_ref(), timeout).await;
            }
            if let Ok(payload) = &result {
                match serde_json::to_value(payload) {
                    Ok(json) => cache.set(&key, json, ttl).await,
                    Err(e) => warn!("Failed to serialize payload for {}: {}", key, e),
                }
            }
            result
        });

        handle
            .await
            .map_err(|e| FetchError::Unavailable(format!("fetch task failed: {e}")))?
    }

    fn degraded(&self, cached: Option<StoredEntry>, err: FetchError) -> FetchOutcome<T> {
        let source = self.remote.source();

        if let Some(entry) = cached
            && let Some(data) = self.decode(&entry)
        {
            let note = if entry.is_valid() {
                "serving cached data"
            } else {
                "serving expired cached data"
            };
            return FetchOutcome {
                data: Some(data),
                status: SourceStatus::warning(source, format!("{note}: {err}")),
            };
        }

        // Nothing to serve. A missing credential is a configuration gap, not
        // a broken provider, and reports one level softer.
        let status = match &err {
            FetchError::MissingCredential(_) => SourceStatus::warning(source, err.to_string()),
            _ => SourceStatus::error(source, err.to_string()),
        };
        FetchOutcome { data: None, status }
    }
}

async fn pull_once<P, T>(remote: &P, timeout: Duration) -> Result<T, FetchError>
where
    P: RemoteSource<Payload = T> + ?Sized,
{
    match tokio::time::timeout(timeout, remote.pull()).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Unavailable(format!(
            "request timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
