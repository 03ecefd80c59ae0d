//! Store watcher background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that polls the store and reloads whatever another
/// surface wrote
pub async fn store_watch_task(state: Arc<AppState>, every: Duration) {
    info!("Starting store watch task, polling every {:?}", every);

    let mut interval = interval(every);

    loop {
        interval.tick().await;

        match state.sync_from_store() {
            Ok(true) => info!("Clock record changed externally, state reloaded"),
            Ok(false) => {
                // Nothing new
            }
            Err(e) => warn!("Failed to sync from store: {}", e),
        }
    }
}
