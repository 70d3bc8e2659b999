//! HTTP surface of the service.
//!
//! Exposes `POST /api/chat`, which hands validated questions to the
//! `ModelDispatcher`, and `GET /api/health`.

mod error;
mod handlers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::error::StartupError;

pub use error::{ApiError, EMPTY_MESSAGE_DETAIL, ErrorResponse, INTERNAL_DETAIL, UPSTREAM_DETAIL};
pub use handlers::{ChatRequest, ChatResponse, HealthResponse};
pub use routes::create_router;
pub use state::AppState;

/// Binds to `host:port` and serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns `StartupError::InvalidAddress` if the address does not parse and
/// `StartupError::Server` if binding or serving fails.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> Result<(), StartupError> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| StartupError::InvalidAddress(format!("{host}:{port}: {e}")))?;

    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::Server(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!(%addr, "Server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Server(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        },
    }
}
