use std::net::{IpAddr, SocketAddr};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::cache::HttpCache;
use crate::config::{DEFAULT_ORIGIN_PORT, MAX_BYTES};
use crate::errors::{ForwardError, ForwardFailure};
use crate::schemas::ParsedRequest;
use crate::utils::DNS_RESOLVER;

/// What a completed origin fetch looked like.
pub struct ForwardOutcome {
    pub bytes_relayed: usize,
    pub cached: bool,
}

/// Fetches the response from the origin server and relays it to the client,
/// capturing the bytes for cache insertion as they stream through.
///
/// Every chunk read from the origin is written to the client in full before
/// the next read, and appended to a growable capture buffer. Only a clean
/// upstream EOF with no prior error counts as a complete capture and triggers
/// `cache.insert`; an upstream or client error mid-stream reports failure with
/// the number of bytes already relayed (those are never retracted) and caches
/// nothing.
///
/// None of resolve, connect, send or receive has a deadline; a silent origin
/// parks this worker and its admission permit indefinitely.
#[tracing::instrument(
    level = "info",
    name = "ForwardOriginRequest",
    skip(client_stream, request, cache),
    fields(key = cache_key)
)]
pub async fn forward_origin_request(
    req_id: Uuid,
    client_stream: &mut TcpStream,
    request: &mut ParsedRequest,
    cache_key: &str,
    cache: &HttpCache,
) -> Result<ForwardOutcome, ForwardFailure> {
    let host = match request.host.clone() {
        Some(host) => host,
        None => {
            return Err(ForwardFailure::before_any_output(ForwardError::Resolve {
                host: String::new(),
                reason: "request has no host".into(),
            }));
        }
    };
    let port = request.port.unwrap_or(DEFAULT_ORIGIN_PORT);

    // Outbound request: minimal request line, the client's headers passed
    // through with Connection forced to close and Host guaranteed present.
    let mut outbound = BytesMut::with_capacity(MAX_BYTES);
    outbound.extend_from_slice(format!("{} {} HTTP/1.1\r\n", request.method, request.path).as_bytes());

    request.set_header("Connection", "close");
    if request.header("Host").is_none() {
        request.set_header("Host", &host);
    }
    let headers = request
        .unparse_headers(MAX_BYTES.saturating_sub(outbound.len()))
        .map_err(|e| ForwardFailure::before_any_output(e.into()))?;
    outbound.extend_from_slice(&headers);

    let ip = resolve_host(&host)
        .await
        .map_err(ForwardFailure::before_any_output)?;
    let addr = SocketAddr::new(ip, port);

    tracing::info!("Connecting to origin {} for request ID {}", addr, req_id);

    let mut origin_stream = TcpStream::connect(addr).await.map_err(|e| {
        ForwardFailure::before_any_output(ForwardError::Connect {
            addr: addr.to_string(),
            source: e,
        })
    })?;

    origin_stream
        .write_all(&outbound)
        .await
        .map_err(|e| ForwardFailure::before_any_output(ForwardError::Send(e)))?;

    // Relay-while-capture loop. `write_all` retries partial client writes
    // until the whole chunk is out; `extend_from_slice` grows the capture
    // buffer geometrically ahead of each append.
    let mut chunk = [0u8; MAX_BYTES];
    let mut captured = BytesMut::with_capacity(MAX_BYTES);
    let mut bytes_relayed = 0usize;

    loop {
        let n = origin_stream
            .read(&mut chunk)
            .await
            .map_err(|e| ForwardFailure {
                error: ForwardError::Receive(e),
                bytes_relayed,
            })?;
        if n == 0 {
            break;
        }

        client_stream
            .write_all(&chunk[..n])
            .await
            .map_err(|e| ForwardFailure {
                error: ForwardError::ClientSend(e),
                bytes_relayed,
            })?;
        bytes_relayed += n;
        captured.extend_from_slice(&chunk[..n]);
    }

    client_stream.flush().await.map_err(|e| ForwardFailure {
        error: ForwardError::ClientSend(e),
        bytes_relayed,
    })?;

    let cached = if bytes_relayed > 0 {
        cache.insert(cache_key, captured.freeze())
    } else {
        false
    };

    tracing::info!(
        bytes_relayed,
        cached,
        "Origin fetch complete for request ID {}",
        req_id
    );

    Ok(ForwardOutcome {
        bytes_relayed,
        cached,
    })
}

/// IP literals short-circuit; hostnames go through the shared resolver.
async fn resolve_host(host: &str) -> Result<IpAddr, ForwardError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let lookup = DNS_RESOLVER
        .lookup_ip(host)
        .await
        .map_err(|e| ForwardError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    lookup.iter().next().ok_or_else(|| ForwardError::Resolve {
        host: host.to_string(),
        reason: "no addresses returned".into(),
    })
}
