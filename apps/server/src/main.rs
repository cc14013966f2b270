//! # Vitrine Server
//!
//! The JSON API behind the admin console and the POS screen.
//!
//! ```text
//! Console / POS ──► axum routes ──► vitrine-core (calculations)
//!                                   vitrine-db   (SQLite)
//! ```

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrine_db::{Database, DbConfig};
use vitrine_server::config::ServerConfig;
use vitrine_server::routes;
use vitrine_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Vitrine server...");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        db_path = %config.database_path,
        company = %config.company_slug,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Resolve the tenant once; everything downstream takes it explicitly.
    let company = db
        .companies()
        .ensure(&config.company_slug, &config.store_name)
        .await?;
    info!(company_id = %company.id, "Company resolved");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db, company.company_id(), config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
