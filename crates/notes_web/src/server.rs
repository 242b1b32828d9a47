//! HTTP listener with graceful shutdown.

use crate::http::build_router;
use crate::state::AppState;
use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serves the application on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("event=server_listen module=web status=ok addr={addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=web status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("event=shutdown_requested module=web status=ok");
    }
}
