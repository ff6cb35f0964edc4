pub mod entry;
pub use entry::CacheEntry;

pub mod metrics;
pub use metrics::CacheMetrics;

pub mod stats;
pub use stats::CacheStats;

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use bytes::Bytes;

use crate::config::CacheConfig;

/// Size-bounded store of previously fetched responses with
/// least-recently-used eviction, shared by every worker.
///
/// The mutex covers bookkeeping only (scan, timestamp refresh, link/unlink,
/// counter updates). Payloads are `Bytes`, so a hit hands back a refcount
/// clone and the caller writes it to the network after the lock is gone.
#[derive(Clone)]
pub struct HttpCache {
    store: Arc<Mutex<CacheStore>>,
    config: CacheConfig,
    metrics: Arc<CacheMetrics>,
}

struct CacheStore {
    entries: VecDeque<CacheEntry>,
    total_size: usize,
}

impl HttpCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore {
                entries: VecDeque::new(),
                total_size: 0,
            })),
            config,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Linear scan for an exact key match, front to back. A hit refreshes the
    /// entry's last-access timestamp and returns a clone of the payload; the
    /// collection itself is never reordered, timestamps alone drive eviction.
    ///
    /// Duplicate keys are possible (inserts never deduplicate); since inserts
    /// go to the front, the most recent entry for a key wins.
    pub fn lookup(&self, key: &str) -> Option<Bytes> {
        let payload = {
            let mut store = self.store.lock().unwrap();
            store
                .entries
                .iter_mut()
                .find(|entry| entry.key == key)
                .map(|entry| {
                    entry.last_access = SystemTime::now();
                    entry.payload.clone()
                })
        };

        match payload {
            Some(payload) => {
                self.metrics.record_hit(payload.len());
                tracing::debug!(key, size = payload.len(), "cache hit");
                Some(payload)
            }
            None => {
                self.metrics.record_miss();
                tracing::debug!(key, "cache miss");
                None
            }
        }
    }

    /// Admits a fully captured response. Entries whose footprint exceeds the
    /// per-entry cap are rejected silently; the caller proceeds as if the
    /// insert were a no-op. Otherwise entries with the smallest last-access
    /// timestamp are evicted until the new entry fits, and the aggregate size
    /// never exceeds total capacity once the insert completes.
    pub fn insert(&self, key: &str, payload: Bytes) -> bool {
        let overhead = self.config.entry_overhead;
        let entry = CacheEntry::new(key.to_string(), payload);
        let footprint = entry.footprint(overhead);

        if footprint > self.config.max_element_size {
            self.metrics.record_rejected_oversize();
            tracing::debug!(key, footprint, "response too large to cache");
            return false;
        }

        let mut store = self.store.lock().unwrap();
        while store.total_size + footprint > self.config.max_size {
            if !store.evict_lru(overhead) {
                break;
            }
            self.metrics.record_eviction();
        }

        store.total_size += footprint;
        store.entries.push_front(entry);
        drop(store);

        self.metrics.record_insertion();
        tracing::debug!(key, footprint, "cached response");
        true
    }

    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock().unwrap();

        CacheStats {
            entries: store.entries.len(),
            total_size: store.total_size,
            capacity: self.config.max_size,
            hit_rate: self.metrics.hit_rate(),
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            insertions: self.metrics.insertions.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            bytes_saved: self.metrics.bytes_saved.load(Ordering::Relaxed),
        }
    }
}

impl CacheStore {
    /// Removes the live entry with the smallest last-access timestamp. The
    /// scan runs front to back with a strictly-smaller comparison, so the
    /// first entry encountered wins ties. Returns false on an empty store.
    fn evict_lru(&mut self, entry_overhead: usize) -> bool {
        let mut victim: Option<(usize, SystemTime)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            match victim {
                Some((_, oldest)) if entry.last_access >= oldest => {}
                _ => victim = Some((idx, entry.last_access)),
            }
        }

        match victim {
            Some((idx, _)) => {
                let removed = self.entries.remove(idx).unwrap();
                self.total_size -= removed.footprint(entry_overhead);
                tracing::debug!(key = %removed.key, "evicted from cache");
                true
            }
            None => false,
        }
    }
}
