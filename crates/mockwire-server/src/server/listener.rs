//! TCP listener and connection loop.

use super::handler::handle_request;
use super::state::ServerState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// A bound mock server, ready to accept connections.
pub struct MockServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl MockServer {
    /// Bind to the configured host and port. Port 0 picks a free port.
    pub async fn bind(state: Arc<ServerState>) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", state.config.host, state.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.local_addr()?;
        info!(
            "Mockwire listening on http://{} (mode: {})",
            addr,
            self.state.mode()
        );
        if let Some(forwarder) = &self.state.forwarder {
            info!("Upstream: {}", forwarder.upstream());
        }
        info!("Loaded {} mappings", self.state.stubs.len());

        loop {
            let (stream, remote_addr) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle_request(state, req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }
}
