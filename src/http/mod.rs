//! HTTP server layer for gridclip.
//!
//! Accepts connections on a tokio listener and serves each one over
//! HTTP/1.1, dispatching requests through the router.

pub mod pages;
pub mod response;
pub mod router;

use crate::config::Config;
use crate::db::SpatialClient;
use crate::error::{GridclipError, Result};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Shared state handed to every request handler.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Spatial database client.
    pub db: Arc<dyn SpatialClient>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(config: Config, db: Arc<dyn SpatialClient>) -> Self {
        Self { config, db }
    }
}

/// Binds the listener and serves requests until Ctrl-C.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GridclipError::http(format!("Failed to bind {addr}: {e}")))?;

    info!("Listening on http://{addr}");

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        debug!(%peer_addr, "Accepted connection");
                        handle_connection(stream, Arc::clone(&state));
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {e}");
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    state.db.close().await?;
    Ok(())
}

/// Serves a single connection in a spawned task.
fn handle_connection(stream: tokio::net::TcpStream, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let conn = http1::Builder::new().serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { router::handle_request(req, state).await }
            }),
        );

        if let Err(err) = conn.await {
            debug!("Connection error: {err}");
        }
    });
}
