pub mod buffer;
pub mod dns;

pub use buffer::read_request_buffer;
pub use dns::DNS_RESOLVER;
