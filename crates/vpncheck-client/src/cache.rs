//! Request-keyed cache-aside layer in front of the external lookup.
//!
//! The cache is an explicit dependency ([`ResponseCache`]) handed to
//! [`LookupCache`], not a process-wide singleton. Entries are keyed by the
//! resolved client IP alone, so credentials never reach the key.
//!
//! Two directives are in play: the stored copy carries a shared-cache
//! `public, max-age=<ttl>`, while every response handed back to the caller
//! carries `no-store`. Body and status are identical on hit and miss.

use crate::config::CachePolicy;
use crate::error::CacheError;
use crate::response::{RawHttpResponse, NO_STORE};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use vpncheck_core::Result;

/// Synthetic origin for cache keys. Never contacted.
const CACHE_KEY_BASE: &str = "https://cache.checkmyvpn.local/ipapi";

/// Cache key for a resolved IP.
///
/// Built from the IP only; form-encoding keeps it collision-free.
#[must_use]
pub fn cache_key(ip: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(ip.as_bytes()).collect();
    format!("{CACHE_KEY_BASE}?q={encoded}")
}

/// `public, max-age=<secs>`
#[must_use]
pub fn edge_directive(ttl: Duration) -> String {
    format!("public, max-age={}", ttl.as_secs())
}

/// Key-value store with per-entry TTL.
///
/// Backends only need entry-level atomic `get`/`put`; no locking is expected
/// across the two calls.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> std::result::Result<Option<RawHttpResponse>, CacheError>;

    /// Store an entry for `ttl`
    async fn put(
        &self,
        key: &str,
        response: RawHttpResponse,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError>;
}

/// Cache-aside wrapper used by the pipeline
#[derive(Clone)]
pub struct LookupCache {
    store: Arc<dyn ResponseCache>,
}

impl LookupCache {
    #[must_use]
    pub fn new(store: Arc<dyn ResponseCache>) -> Self {
        Self { store }
    }

    /// Serve `ip` from the cache or call `fetcher` and store the result.
    ///
    /// Every upstream answer is stored, non-2xx included, so a rate-limited
    /// upstream is not hit again within the TTL. Fetcher errors propagate
    /// and are never cached. A cache that cannot be reached behaves like an
    /// empty one.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        ip: &str,
        ttl: Duration,
        fetcher: F,
    ) -> Result<RawHttpResponse>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<RawHttpResponse>> + Send,
    {
        let key = cache_key(ip);

        match self.store.get(&key).await {
            Ok(Some(hit)) => {
                debug!(ip = %ip, "ipapi cache hit");
                return Ok(hit.with_cache_control(NO_STORE));
            }
            Ok(None) => debug!(ip = %ip, "ipapi cache miss"),
            Err(e) => warn!(ip = %ip, error = %e, "cache read failed, fetching directly"),
        }

        let fresh = fetcher().await?;

        let stored = fresh.clone().with_cache_control(&edge_directive(ttl));
        if let Err(e) = self.store.put(&key, stored, ttl).await {
            warn!(ip = %ip, error = %e, "cache write failed");
        }

        Ok(fresh.with_cache_control(NO_STORE))
    }
}

#[derive(Clone)]
struct Entry {
    response: RawHttpResponse,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with
struct StoredTtl;

impl Expiry<String, Entry> for StoredTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Bounded in-process [`ResponseCache`] backed by `moka`.
///
/// TTLs longer than [`CachePolicy::MAX_TTL`] are clamped.
pub struct MemoryCache {
    entries: Cache<String, Entry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(u64::try_from(max_entries).unwrap_or(u64::MAX))
            .expire_after(StoredTtl)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> std::result::Result<Option<RawHttpResponse>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.response))
    }

    async fn put(
        &self,
        key: &str,
        response: RawHttpResponse,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        let entry = Entry {
            response,
            ttl: ttl.min(CachePolicy::MAX_TTL),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }
}
