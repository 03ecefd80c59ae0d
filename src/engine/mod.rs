//! Clock engine module
//!
//! The level/break state machine, its event types and the observer snapshot.

pub mod clock;
pub mod events;
pub mod snapshot;

// Re-export main types
pub use clock::{ClockEngine, Phase, BREAK_CUT_SECONDS};
pub use events::{AlertKind, ClockEvent};
pub use snapshot::ClockSnapshot;
