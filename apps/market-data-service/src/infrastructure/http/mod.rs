//! Query Surface
//!
//! HTTP server exposing cached market data and scheduler controls.
//!
//! # Endpoints
//!
//! - `GET /quote/{symbols}` - Cached records for comma-separated symbols
//! - `GET /all` - Full cache snapshot with count
//! - `GET /status` - Scheduler state, freshness, cached symbols
//! - `GET|POST /start`, `GET|POST /stop` - Scheduler controls
//! - `GET /ws` - WebSocket upgrade for `market_update` events
//! - `GET /health`, `GET /healthz` - Service health

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub mod controller;
pub mod response;
pub mod ws;

pub use controller::{AppState, create_router};

/// Query surface HTTP server.
pub struct ApiServer {
    port: u16,
    state: AppState,
    cancel: CancellationToken,
}

impl ApiServer {
    /// Create a new API server.
    #[must_use]
    pub const fn new(port: u16, state: AppState, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the HTTP server encounters
    /// a fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = create_router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Market data API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Market data API stopped");
        Ok(())
    }
}

/// Query surface server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
