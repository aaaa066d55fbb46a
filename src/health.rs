//! Liveness HTTP server
//!
//! Answers hosting platform health checks. Shares nothing with the bot.

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Body of `GET /`
pub const ROOT_BODY: &str = "Bot is running!";
/// Body of `GET /health`
pub const HEALTH_BODY: &str = "OK";

async fn index() -> &'static str {
    ROOT_BODY
}

async fn health() -> &'static str {
    HEALTH_BODY
}

/// Build the liveness router
pub fn build_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
}

/// Serve the liveness router on an already bound listener until the process exits
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, build_router()).await
}

/// Bind `0.0.0.0:port` and run the liveness server as a background task.
///
/// Failures are logged; the bot keeps running without the endpoint.
pub fn spawn(port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(%addr, "Failed to bind liveness server: {e}");
                return;
            }
        };

        info!(%addr, "Liveness server starting");
        if let Err(e) = serve(listener).await {
            error!("Liveness server stopped: {e}");
        }
    })
}
