//! Gateway Server - Axum HTTP server

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::store::ObjectStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub config: Arc<GatewayConfig>,
}

/// Gateway server instance
pub struct GatewayServer {
    host: String,
    port: u16,
    state: AppState,
}

impl GatewayServer {
    pub fn new(host: String, port: u16, store: Arc<dyn ObjectStore>, config: GatewayConfig) -> Self {
        let state = AppState {
            store,
            config: Arc::new(config),
        };

        Self { host, port, state }
    }

    /// Router with every request funnelled into the image handler
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Run the gateway server (blocking)
    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Image gateway listening on {}", addr);

        // Handle graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Image gateway stopped");
        Ok(())
    }
}

/// Preflight must see every path, so there are no per-path routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(super::handler::handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
