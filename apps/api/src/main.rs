//! # Rentiva API
//!
//! HTTP server for the rental marketplace backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (all optional in development)
//! export HTTP_PORT=8080
//! export DATABASE_PATH=./rentiva.db
//! export JWT_SECRET=shared-secret-with-identity-provider
//!
//! # Run the server
//! rentiva-api
//! ```

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rentiva_api::{config::ApiConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting Rentiva API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database and run migrations
    let state = AppState::new(&config).await.map_err(|e| e.message.clone())?;
    info!("Database ready");

    let db = state.db.clone();

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = config.socket_addr();
    info!("Rentiva API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
