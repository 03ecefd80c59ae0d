//! Tourney Clock - a tournament clock with levels, breaks and a shared record
//! 
//! This library provides the level/break clock engine, the persisted record it
//! shares with other clock instances, and the HTTP control surface around it.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{ClockEngine, ClockEvent};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
