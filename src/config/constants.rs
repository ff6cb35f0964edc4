/// Maximum number of workers simultaneously past the admission gate.
pub const MAX_CLIENTS: usize = 10;

/// Request buffer maximum and transfer chunk size, in bytes. A request whose
/// headers do not fit in this many bytes is rejected with a 400; cached and
/// relayed payloads are written to the client in chunks of at most this size.
pub const MAX_BYTES: usize = 4096;

/// Per-entry cache cap. Responses whose footprint exceeds this are relayed to
/// the client but never cached.
pub const MAX_ELEMENT_SIZE: usize = 10 * (1 << 10);

/// Total cache capacity across all entries.
pub const MAX_CACHE_SIZE: usize = 200 * (1 << 20);

/// Fixed bookkeeping overhead charged to every cache entry on top of its
/// payload and key lengths.
pub const CACHE_ENTRY_OVERHEAD: usize = 64;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Origin port used when the request carries no explicit port.
pub const DEFAULT_ORIGIN_PORT: u16 = 80;

/// Token reported in the `Server` header of generated error pages.
pub const SERVER_TOKEN: &str = concat!("caching-proxy/", env!("CARGO_PKG_VERSION"));
