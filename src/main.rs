//! Tourney Clock - a tournament clock with levels, breaks and a shared record
//! 
//! This is the main entry point for the tourney-clock application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tourney_clock::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{AlertPlayer, FileStore},
    tasks::{event_listener_task, store_watch_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tourney_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tourney-clock v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, data_dir={}, passive={}",
          config.host, config.port, config.data_dir.display(), config.passive);

    // Load the shared clock record (or create the default structure)
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let state = Arc::new(AppState::new(store, config.passive));

    // Log clock events and play alerts
    let events = state.subscribe();
    tokio::spawn(event_listener_task(events, AlertPlayer::new(config.bell)));

    // Pick up changes written by other surfaces
    let watch_state = Arc::clone(&state);
    let every = config.reload_every();
    tokio::spawn(async move {
        store_watch_task(watch_state, every).await;
    });

    // A control instance keeps driving a clock that was running when it stopped
    if let Err(e) = state.resume_if_running() {
        tracing::error!("Failed to resume countdown: {}", e);
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status      - Clock snapshot for displays");
    info!("  GET  /tournament  - Tournament metadata");
    if !config.passive {
        info!("  POST /start /stop /reset /next /previous /break-cut");
        info!("  POST /configurations, /configurations/:index/select");
        info!("  PUT  /configurations/:index/levels/:level, /configurations/:index/breaks/:after");
        info!("  POST /reload /wipe");
    }
    info!("  GET  /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
