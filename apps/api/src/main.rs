//! # Apotek API Server
//!
//! Binary entry point: loads configuration, opens the SQLite database
//! (running migrations on the way up), and serves the REST API.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Server Startup                             │
//! │                                                                     │
//! │  .env ──► ApiConfig ──► Database::new (WAL + migrations)            │
//! │                              │                                      │
//! │                              ▼                                      │
//! │                         axum Router ──► 0.0.0.0:PORT                │
//! │                              │                                      │
//! │                    Ctrl-C / SIGTERM ──► graceful shutdown           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use apotek_api::config::ApiConfig;
use apotek_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; missing files are fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    info!("Starting Apotek API server...");

    let config = ApiConfig::load()?;
    info!(port = config.port, db = %config.database_path, "Configuration loaded");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready, migrations applied");

    let app = apotek_api::app(db);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, letting in-flight requests finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
