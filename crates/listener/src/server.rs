//! axum HTTP server.
//!
//! # Endpoints
//!
//! - `POST <webhook_path>` - one webhook delivery, answered synchronously
//! - `GET /health` - 200 `OK` while the process is up

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::{get, post};
use axum::Router;
use dispatch::{Dispatcher, Headers, InboundRequest};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::response::WebhookReply;

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Builds the router.
///
/// `webhook_path` must start with `/` and differ from [`HEALTH_PATH`]; axum
/// panics on an invalid or conflicting route.
pub fn build_router(dispatcher: Arc<Dispatcher>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(webhook_handler))
        .route(HEALTH_PATH, get(health_handler))
        .with_state(AppState { dispatcher })
}

/// Binds `addr` and serves `router` until CTRL+C or SIGTERM.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn webhook_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookReply {
    let request = InboundRequest::new(convert_headers(&headers), body.to_vec())
        .with_route(method.as_str(), uri.path());
    WebhookReply(state.dispatcher.dispatch(&request).await)
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Copies headers into the dispatcher's map. Values that are not visible
/// ASCII are dropped; for repeated names the first value wins.
fn convert_headers(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string())))
        .collect()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
