pub mod constants;
pub mod settings;

pub use constants::{
    CACHE_ENTRY_OVERHEAD, DEFAULT_HOST, DEFAULT_ORIGIN_PORT, DEFAULT_PORT, MAX_BYTES,
    MAX_CACHE_SIZE, MAX_CLIENTS, MAX_ELEMENT_SIZE, SERVER_TOKEN,
};
pub use settings::{CacheConfig, ProxyConfig};
