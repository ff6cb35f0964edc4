use std::time::SystemTime;

use bytes::Bytes;

/// One cached response. Entries are created only by a successful full origin
/// capture, mutated only by lookup (timestamp refresh) and destroyed only by
/// eviction.
#[derive(Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Bytes,
    pub last_access: SystemTime,
}

impl CacheEntry {
    pub fn new(key: String, payload: Bytes) -> Self {
        Self {
            key,
            payload,
            last_access: SystemTime::now(),
        }
    }

    /// Bytes this entry counts against the cache capacity: payload plus key
    /// plus the fixed bookkeeping overhead.
    pub fn footprint(&self, entry_overhead: usize) -> usize {
        self.payload.len() + self.key.len() + entry_overhead
    }
}
