//! Countdown driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that ticks the clock once per second while it runs.
///
/// Spawned by `AppState::start` and aborted by stop. It also ends on its own
/// as soon as a tick leaves the clock stopped.
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let period = Duration::from_secs(1);
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.tick() {
            Ok(true) => {}
            Ok(false) => {
                debug!("Clock stopped, countdown task exiting");
                break;
            }
            Err(e) => {
                error!("Countdown tick failed: {}", e);
                break;
            }
        }
    }
}
