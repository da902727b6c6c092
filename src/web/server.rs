//! Web server for fileshare.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::MetadataStore;
use crate::file::{FileShareService, FileStorage};
use crate::{Database, FileShareError, Result};

use super::handlers::AppState;
use super::router::create_app;

/// Web server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Directory served for unmatched paths.
    public_dir: String,
}

impl WebServer {
    /// Create a new web server on top of a metadata store.
    pub fn new(config: &Config, store: Arc<dyn MetadataStore>) -> Result<Self> {
        let ip: IpAddr = config.server.host.parse().map_err(|e| {
            FileShareError::Config(format!("invalid host {:?}: {e}", config.server.host))
        })?;

        let storage = FileStorage::new(&config.storage.upload_dir);
        let app_state = AppState::new(FileShareService::new(storage, store))
            .with_trust_proxy(config.server.trust_proxy);

        Ok(Self {
            addr: SocketAddr::new(ip, config.server.port),
            app_state: Arc::new(app_state),
            cors_origins: config.server.cors_origins.clone(),
            public_dir: config.storage.public_dir.clone(),
        })
    }

    /// Create a new web server from a Database.
    pub fn from_database(config: &Config, db: Database) -> Result<Self> {
        Self::new(config, Arc::new(db))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the application router.
    pub fn router(&self) -> Router {
        create_app(self.app_state.clone(), &self.cors_origins, &self.public_dir)
    }

    async fn bind(&self) -> std::io::Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Server running at http://{}", local_addr);
        Ok((listener, local_addr))
    }

    /// Run the web server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> std::io::Result<()> {
        let router = self.router();
        let (listener, _) = self.bind().await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = self.router();
        let (listener, local_addr) = self.bind().await?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

impl std::fmt::Debug for WebServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServer")
            .field("addr", &self.addr)
            .field("public_dir", &self.public_dir)
            .finish_non_exhaustive()
    }
}

/// Resolve when the process is asked to stop.
pub async fn shutdown_signal() {
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
