//! # Ateneo REST API Server
//!
//! Binary entry point: tracing init, config, database, router, serve.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing subscriber (RUST_LOG, default info)                         │
//! │  2. ApiConfig::from_env  (DATABASE_URL required)                        │
//! │  3. Database::new        (pool + embedded migrations)                   │
//! │  4. build_router         (routes + TraceLayer + CORS)                   │
//! │  5. axum::serve          (graceful shutdown on ctrl-c / SIGTERM)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ateneo_db::{Database, DbConfig};
use ateneo_rest_api::{build_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Ateneo REST API server...");

    // Load configuration
    let config = ApiConfig::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        db_max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    // Connect to database (runs migrations unless disabled)
    let db_config = DbConfig::new(&config.database_url)
        .max_connections(config.db_max_connections)
        .run_migrations(config.db_run_migrations);
    let db = Database::new(db_config).await?;
    info!("Connected to PostgreSQL");

    // Build the router
    let state = AppState::new(db.clone(), config.clone());
    let app = build_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "HTTP server started");

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
