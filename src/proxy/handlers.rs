use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::cache::HttpCache;
use crate::client::forward_origin_request;
use crate::config::MAX_BYTES;
use crate::proxy::response::send_error_response;
use crate::schemas::ParsedRequest;
use crate::utils::read_request_buffer;

/// Runs one full request cycle for an accepted connection, then shuts the
/// socket down. Exactly one response per connection; no keep-alive to the
/// client regardless of what the client or the origin asked for.
#[tracing::instrument(level = "info", name = "Worker", skip(stream, cache))]
pub async fn handle_client(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    cache: HttpCache,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let result = process_connection(&mut stream, peer_addr, cache).await;

    if let Err(e) = stream.shutdown().await {
        tracing::trace!(error = %e, "error shutting down client socket");
    }

    result
}

async fn process_connection(
    stream: &mut TcpStream,
    peer_addr: SocketAddr,
    cache: HttpCache,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let req_id = Uuid::new_v4();

    let raw = match read_request_buffer(stream, MAX_BYTES).await? {
        Some(raw) => raw,
        None => {
            tracing::info!("Client {} disconnected before sending data", peer_addr);
            return Ok(());
        }
    };

    // Covers both malformed bytes and a buffer that filled up without ever
    // containing the header terminator.
    let mut request = match ParsedRequest::parse(&raw) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting unparseable request from {}", peer_addr);
            send_error_response(stream, 400).await?;
            return Ok(());
        }
    };

    if request.method != "GET" {
        tracing::info!(
            method = %request.method,
            "Rejecting unsupported method for request ID {}",
            req_id
        );
        send_error_response(stream, 501).await?;
        return Ok(());
    }

    let host = match request.host.clone().filter(|h| !h.is_empty()) {
        Some(host)
            if !request.path.is_empty()
                && matches!(request.version.as_str(), "HTTP/1.0" | "HTTP/1.1") =>
        {
            host
        }
        _ => {
            tracing::warn!(
                host = ?request.host,
                path = %request.path,
                version = %request.version,
                "Rejecting incomplete GET for request ID {}",
                req_id
            );
            send_error_response(stream, 400).await?;
            return Ok(());
        }
    };

    // Exact bytes, no normalization or percent-decoding.
    let cache_key = format!("{}{}", host, request.path);

    match cache.lookup(&cache_key) {
        Some(payload) => {
            tracing::info!(key = %cache_key, "Serving request ID {} from cache", req_id);
            serve_cached_payload(stream, &payload).await?;
        }
        None => {
            match forward_origin_request(req_id, stream, &mut request, &cache_key, &cache).await {
                Ok(outcome) => {
                    tracing::info!(
                        bytes = outcome.bytes_relayed,
                        cached = outcome.cached,
                        "Forwarded request ID {}",
                        req_id
                    );
                }
                Err(failure) => {
                    tracing::error!(error = %failure.error, "Forwarding failed for request ID {}", req_id);

                    // A 500 page is only coherent while the response is still
                    // untouched; after the first relayed byte, just abort.
                    if failure.bytes_relayed == 0 {
                        send_error_response(stream, 500).await?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Streams a cached payload to the client in bounded chunks.
async fn serve_cached_payload(stream: &mut TcpStream, payload: &Bytes) -> std::io::Result<()> {
    for chunk in payload.chunks(MAX_BYTES) {
        stream.write_all(chunk).await?;
    }
    stream.flush().await
}
