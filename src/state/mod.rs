//! State management module
//! 
//! This module contains the clock record, the blind structure, tournament
//! metadata and the shared application state.

pub mod structure;
pub mod clock_state;
pub mod tournament;
pub mod app_state;

// Re-export main types
pub use structure::{Break, Configuration, Level};
pub use clock_state::{default_configuration, ClockState, Settings};
pub use tournament::TournamentInfo;
pub use app_state::AppState;
