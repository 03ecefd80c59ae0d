//! Clock event listener background task

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, trace, warn};

use crate::{
    engine::ClockEvent,
    services::AlertPlayer,
};

/// Background task that logs clock events and hands alerts to the player
pub async fn event_listener_task(mut events: broadcast::Receiver<ClockEvent>, player: AlertPlayer) {
    info!("Starting clock event listener");

    loop {
        match events.recv().await {
            Ok(ClockEvent::TimeUpdated { remaining_seconds }) => {
                trace!("Time remaining: {}s", remaining_seconds);
            }
            Ok(ClockEvent::LevelChanged { level_index, is_on_break }) => {
                if is_on_break {
                    info!("Break after level {}", level_index + 1);
                } else {
                    info!("Now at level {}", level_index + 1);
                }
            }
            Ok(ClockEvent::Alert { kind }) => {
                // a failed alert never affects the clock
                if let Err(e) = player.play(kind) {
                    debug!("Alert playback failed: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event listener lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Clock event channel closed, listener exiting");
                break;
            }
        }
    }
}
