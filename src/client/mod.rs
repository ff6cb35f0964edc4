pub mod http;

pub use http::{ForwardOutcome, forward_origin_request};
