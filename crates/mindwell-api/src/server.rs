//! API server implementation

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::MindwellConfig;
use crate::routes;
use crate::{AppState, Error, Result};

/// Mindwell API server
pub struct Server {
    config: MindwellConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a server from validated configuration.
    ///
    /// Opens the document store and the mailer; nothing is bound until
    /// [`Server::serve`].
    pub async fn new(config: MindwellConfig) -> Result<Self> {
        config.validate()?;
        if config.uses_dev_secret() {
            tracing::warn!("Using the built-in development JWT secret; set MINDWELL_JWT_SECRET");
        }
        let state = Arc::new(AppState::from_config(&config).await?);
        Ok(Self { config, state })
    }

    /// Shared state.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// The full router, with layers applied.
    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    /// Bind and serve until Ctrl+C or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(Error::Server)?;
        tracing::info!(%address, "Mindwell API listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(Error::Server)?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
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
}
