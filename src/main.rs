//! Countdown Tools - countdown timer tool server
//!
//! This is the main entry point for the countdown-tools server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_tools::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::timer_tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_tools={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-tools server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, history_limit={}, poll_interval={}ms",
        config.host, config.port, config.history_limit, config.poll_interval_ms
    );

    // Create application state
    let state = Arc::new(AppState::new(config.history_limit, config.poll_interval_ms));

    // Start the timer tick background task
    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
        timer_tick_task(store).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /tools/startTimer         - Start a timer");
    info!("  POST /tools/controlTimer       - Pause, resume or stop a timer");
    info!("  GET  /tools/getTimerStatus     - Active timers, history and presets");
    info!("  GET  /api/timers               - Status for the polling frontend");
    info!("  POST /api/timers               - Start a timer (frontend)");
    info!("  POST /api/timers/:id/control   - Control a timer (frontend)");
    info!("  POST /mcp                      - MCP JSON-RPC endpoint");
    info!("  GET  /health                   - Health check");

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
