//! Simmer - concurrent step timers for a recipe cooking assistant
//!
//! This is the main entry point for the simmer service.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use simmer::{
    api::{create_router, ServerState},
    config::Config,
    state::TimerRegistry,
    tasks::completion_alert_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("simmer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting simmer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, alert_command={}",
        config.host,
        config.port,
        config.alert_command.as_deref().unwrap_or("(log only)")
    );

    // Create the timer registry
    let registry = TimerRegistry::new();

    // Start the completion alert background task
    let events = registry.subscribe_events();
    let alert_command = config.alert_command.clone();
    tokio::spawn(async move {
        completion_alert_task(events, alert_command).await;
    });

    // Create HTTP router with all endpoints
    let state = Arc::new(ServerState::new(
        registry.clone(),
        config.host.clone(),
        config.port,
    ));
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{addr}");
    info!("Endpoints:");
    info!("  POST /timers/:id/start  - Start or restart a countdown");
    info!("  POST /timers/:id/pause  - Pause a running countdown");
    info!("  POST /timers/:id/resume - Resume a paused countdown");
    info!("  POST /timers/:id/cancel - Cancel a countdown");
    info!("  GET  /timers/:id        - Query one timer");
    info!("  GET  /status            - All timers and server status");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {e}");
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop every live countdown driver before exiting
    if let Err(e) = registry.shutdown() {
        error!("Failed to stop live timers during shutdown: {e}");
    }

    info!("Server shutdown complete");
    Ok(())
}
