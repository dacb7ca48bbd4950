use std::sync::Arc;

use anyhow::Result;
use persistence::PersistenceGateway;
use tracing::{info, warn};

use attendance_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Attendance Tracker v{}", env!("CARGO_PKG_VERSION"));

    // Select the backend once; it serves every collection until shutdown
    let gateway = PersistenceGateway::open(&config.store).await?;
    info!(backend = %gateway.backend(), "Persistence backend selected");
    gateway.load_all().await;

    // Build application
    let app = app::create_app(config.clone(), Arc::new(gateway));

    // Start server
    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
