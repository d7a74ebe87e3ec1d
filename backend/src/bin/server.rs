//! Service Compare HTTP Server Binary
//!
//! This is the main entry point for the comparison dashboard.
//! It initializes the repository, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin service-compare-server
//!
//! # Run against PostgreSQL directly
//! DB_HOST=db.internal DB_NAME=bookings DB_USER=reader DB_PASSWORD=... \
//!   cargo run --bin service-compare-server --features postgres-repo
//!
//! # Run through an SSH bastion
//! DB_MODE=tunnel SSH_HOST=bastion.example.com SSH_KEY_PATH=~/.ssh/bastion.pem \
//!   DB_HOST=db.internal DB_NAME=bookings DB_USER=reader \
//!   cargo run --bin service-compare-server --features postgres-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `postgres` or `local` (default: postgres if `DB_HOST` is set)
//! - `DB_*` / `SSH_*`: database and tunnel settings, see `DatabaseSettings::from_env`
//! - `RUST_LOG`: Log level (default: info)
//!
//! A `repository.toml` in the working directory takes precedence over the
//! environment.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use service_compare::db::{
    BookingRepository, RepositoryConfig, RepositoryFactory, RepositoryType,
};
use service_compare::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Service Compare HTTP Server");

    let repository = create_repository()?;
    info!(
        "Repository initialized (connection {})",
        repository.connection_state()
    );

    // Create application state
    let state = AppState::new(Arc::clone(&repository));

    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);
    info!("Dashboard: http://{}/  Health: http://{}/health", addr, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down connection provider");
    repository.shutdown();

    Ok(())
}

fn create_repository() -> anyhow::Result<Arc<dyn BookingRepository>> {
    let repository = match RepositoryConfig::find_default_file() {
        Some(path) => {
            info!("Loading repository configuration from {}", path.display());
            RepositoryFactory::from_config_file(&path)
        }
        None => {
            if let Ok(RepositoryType::Local) = RepositoryType::from_env() {
                warn!("No database configured (set DB_HOST or REPOSITORY_TYPE); serving the empty in-memory repository");
            }
            RepositoryFactory::from_env()
        }
    };
    repository.context("Failed to initialize repository")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
