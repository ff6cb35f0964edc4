//! Shared helpers for the proxy integration tests: a programmable origin
//! stub and a client-side roundtrip.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use caching_proxy::cache::HttpCache;
use caching_proxy::config::ProxyConfig;
use caching_proxy::server::start_proxy_server;

/// Starts an origin server that answers every connection with the same canned
/// bytes. Returns its address and a counter of accepted connections, so tests
/// can assert whether the proxy went upstream at all.
pub async fn start_origin_stub(response: Vec<u8>) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let response = response.clone();
            tokio::spawn(async move {
                read_request_head(&mut stream).await;
                stream.write_all(&response).await.ok();
                stream.shutdown().await.ok();
            });
        }
    });

    (addr, connections)
}

async fn read_request_head(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            return;
        }
    }
}

/// Spawns a proxy on the given port over the given cache (tests keep a clone
/// to inspect it) and waits until it accepts connections.
pub async fn start_proxy(port: u16, cache: HttpCache) {
    let config = ProxyConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ProxyConfig::default()
    };

    tokio::spawn(async move {
        if let Err(e) = start_proxy_server(config, cache).await {
            panic!("proxy failed to start on port {port}: {e}");
        }
    });

    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    for _ in 0..50 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("proxy on port {port} never came up");
}

/// One request cycle against the proxy: connect, send, read until the proxy
/// closes the connection.
pub async fn roundtrip(proxy_port: u16, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{proxy_port}"))
        .await
        .unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

/// A canned origin response padded so the total wire size is exactly `total`.
pub fn canned_response(total: usize) -> Vec<u8> {
    let head = "HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Type: text/plain\r\n\r\n";
    assert!(total > head.len());
    let mut response = head.as_bytes().to_vec();
    let mut fill = 0u8;
    while response.len() < total {
        response.push(b'a' + (fill % 26));
        fill = fill.wrapping_add(1);
    }
    response
}
