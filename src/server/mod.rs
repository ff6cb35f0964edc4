use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::cache::HttpCache;
use crate::config::ProxyConfig;
use crate::proxy::handle_client;

/// Binds the listening socket and accepts connections forever.
///
/// Each accepted stream moves by value into its own task at spawn time; the
/// accept loop never parks a socket anywhere a later iteration could touch.
/// The concurrency bound is enforced inside the task, not here: accepting is
/// never throttled, and tasks queue up at the admission gate while at most
/// `max_clients` of them run the pipeline. The permit guard drops on every
/// exit path of the worker.
#[tracing::instrument(level = "info", name = "Server", skip(config, cache))]
pub async fn start_proxy_server(
    config: ProxyConfig,
    cache: HttpCache,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Proxy server listening on {}", addr);

    let admission = Arc::new(Semaphore::new(config.max_clients));

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        tracing::info!("Accepted connection from {}", peer_addr);

        let admission = Arc::clone(&admission);
        let cache = cache.clone();

        tokio::task::spawn(async move {
            let Ok(_permit) = Arc::clone(&admission).acquire_owned().await else {
                // the semaphore is never closed while the server runs
                return;
            };
            tracing::debug!(
                available_permits = admission.available_permits(),
                "Admission permit acquired for {}",
                peer_addr
            );

            if let Err(e) = handle_client(stream, peer_addr, cache).await {
                tracing::error!(error = %e, "Error serving connection from {}", peer_addr);
            }
        });
    }
}
