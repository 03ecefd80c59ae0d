//! Notifications broadcast by the clock engine
//!
//! Observers subscribe to a `tokio::sync::broadcast` channel of these values.
//! Events are sent after the state they describe has been applied and before
//! the record is persisted.

use serde::Serialize;

/// Discrete sound cues for the alert collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Short beep at 3, 2 and 1 seconds left
    Pip,
    /// One minute left in a level
    OneMinuteWarning,
    /// A level or break ran out
    LevelEnd,
}

/// Event broadcast to everything watching a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockEvent {
    /// Fired on every countdown step
    TimeUpdated { remaining_seconds: u32 },
    /// Fired whenever the active level or break changes
    LevelChanged { level_index: usize, is_on_break: bool },
    /// Cue for the alert collaborator
    Alert { kind: AlertKind },
}
