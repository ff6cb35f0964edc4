pub mod request;

pub use request::ParsedRequest;
