//! HTTP and WebSocket surface of the chat server.

pub mod app;
pub mod http;
pub mod ws;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use chatter_core::{ChatterConfig, ChatterError};
use tokio::net::TcpListener;
use tracing::info;

pub use app::{build_router, AppState};

/// Bind the TCP listener for the configured address.
pub async fn bind(config: &ChatterConfig) -> chatter_core::Result<TcpListener> {
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .map_err(|e| ChatterError::InvalidAddress(format!("{}: {e}", config.listen_addr())))?;
    Ok(TcpListener::bind(addr).await?)
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> chatter_core::Result<()> {
    info!("Chat server is running on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
