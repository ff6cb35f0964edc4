use std::io;

use thiserror::Error;

/// Failures produced by the request parsing/serialization collaborator.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("incomplete request: header terminator not found")]
    Incomplete,

    #[error("serialized headers exceed the {0}-byte capacity")]
    CapacityExceeded(usize),
}

/// Failures while fetching a response from the origin server.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to resolve origin host {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("failed to serialize outbound request: {0}")]
    Serialize(#[from] SchemaError),

    #[error("failed to connect to origin {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send request to origin: {0}")]
    Send(#[source] io::Error),

    #[error("failed to receive response from origin: {0}")]
    Receive(#[source] io::Error),

    #[error("failed to relay response to client: {0}")]
    ClientSend(#[source] io::Error),
}

/// A forwarding failure together with how many response bytes had already been
/// relayed to the client when it happened. The worker sends a 500 page only
/// when nothing has been relayed yet; otherwise it aborts silently.
#[derive(Debug, Error)]
#[error("{error} (after {bytes_relayed} bytes relayed)")]
pub struct ForwardFailure {
    pub error: ForwardError,
    pub bytes_relayed: usize,
}

impl ForwardFailure {
    pub fn before_any_output(error: ForwardError) -> Self {
        Self {
            error,
            bytes_relayed: 0,
        }
    }
}
