use crate::config::constants::{
    CACHE_ENTRY_OVERHEAD, DEFAULT_HOST, DEFAULT_PORT, MAX_CACHE_SIZE, MAX_CLIENTS,
    MAX_ELEMENT_SIZE,
};

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub max_clients: usize,
    pub cache: CacheConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clients: MAX_CLIENTS,
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Total capacity across all entries. Must exceed `max_element_size`.
    pub max_size: usize,
    /// Largest footprint a single entry may have; bigger payloads are never
    /// cached.
    pub max_element_size: usize,
    /// Bookkeeping bytes charged per entry in addition to payload + key.
    pub entry_overhead: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_CACHE_SIZE,
            max_element_size: MAX_ELEMENT_SIZE,
            entry_overhead: CACHE_ENTRY_OVERHEAD,
        }
    }
}
