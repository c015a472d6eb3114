//! Cache Store Module
//!
//! In-memory response cache: a HashMap of encoded responses behind a single
//! mutex, with one TTL applied to every entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::HeaderValue;
use tracing::{debug, warn};

use crate::body::{HttpRequest, HttpResponse};
use crate::cache::{
    current_timestamp, decode, encode, is_cacheable, key_for, Cache, CacheEntry, CacheStats,
    StatsSnapshot, XFROM_CACHE, XFROM_CACHE_VALUE,
};
use crate::error::ConfigError;

// == Memory Cache ==
/// Process-local response cache with TTL expiration.
///
/// The lock only guards map reads and writes; encoding and decoding run on
/// private buffers outside it. Stale entries are dropped lazily when looked
/// up (or by [`MemoryCache::purge_expired`]). There is no capacity bound, so
/// traffic against ever-changing URLs grows the map until entries expire and
/// are touched again.
#[derive(Debug)]
pub struct MemoryCache {
    /// Cache key to stored entry
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// TTL in seconds, applied at write time
    ttl: u64,
    /// Activity counters
    stats: Arc<CacheStats>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache whose entries live `ttl` seconds.
    ///
    /// # Errors
    /// [`ConfigError::InvalidTtl`] if `ttl` is zero.
    pub fn new(ttl: u64) -> Result<Self, ConfigError> {
        if ttl == 0 {
            return Err(ConfigError::InvalidTtl);
        }
        Ok(Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            stats: Arc::new(CacheStats::new()),
        })
    }

    /// Records activity into `stats` instead of a private counter set.
    pub fn with_stats(mut self, stats: Arc<CacheStats>) -> Self {
        self.stats = stats;
        self
    }

    /// TTL in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // == Purge Expired ==
    /// Removes all stale entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp();
        let removed = {
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh_at(now));
            before - entries.len()
        };
        self.stats.record_expired(removed as u64);
        removed
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic elsewhere cannot leave the map half-written; keep serving.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes `key` only if it still maps to `expected`.
    fn remove_if_same(&self, key: &str, expected: &CacheEntry) {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|current| current.same_as(expected)) {
            entries.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_entry(&self, key: String, entry: CacheEntry) {
        self.lock().insert(key, entry);
    }

    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}

impl Cache for MemoryCache {
    // == Get ==
    fn get(&self, req: &HttpRequest) -> Option<HttpResponse> {
        let key = key_for(req);

        let entry = {
            let mut entries = self.lock();
            let found = entries.get(&key).cloned();
            match found {
                Some(entry) if entry.is_fresh() => entry,
                Some(_) => {
                    entries.remove(&key);
                    drop(entries);
                    self.stats.record_expired(1);
                    self.stats.record_miss();
                    debug!(key = %key, "Cache entry expired");
                    return None;
                }
                None => {
                    drop(entries);
                    self.stats.record_miss();
                    return None;
                }
            }
        };

        match decode(&entry.payload, req) {
            Ok(mut rsp) => {
                rsp.headers_mut()
                    .insert(XFROM_CACHE, HeaderValue::from_static(XFROM_CACHE_VALUE));
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                Some(rsp)
            }
            Err(err) => {
                warn!(
                    method = %req.method(),
                    url = %req.uri(),
                    error = %err,
                    "Error reading cached response, dropping entry"
                );
                self.remove_if_same(&key, &entry);
                self.stats.record_corrupted();
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    fn set(&self, req: &HttpRequest, rsp: &mut HttpResponse) {
        if !is_cacheable(req.method(), rsp.status()) {
            self.stats.record_skipped();
            return;
        }

        let payload = match encode(rsp, req.method()) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(url = %req.uri(), error = %err, "Response not cached");
                self.stats.record_skipped();
                return;
            }
        };

        let key = key_for(req);
        let entry = CacheEntry::new(payload, self.ttl);
        self.lock().insert(key.clone(), entry);

        self.stats.record_stored();
        debug!(key = %key, ttl = self.ttl, "Response cached");
    }

    // == Delete ==
    fn delete(&self, req: &HttpRequest) {
        let removed = self.lock().remove(&key_for(req));
        if removed.is_some() {
            self.stats.record_deleted();
        }
    }
}
