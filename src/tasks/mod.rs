//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown;
pub mod event_listener;
pub mod store_watch;

// Re-export main functions
pub use countdown::countdown_task;
pub use event_listener::event_listener_task;
pub use store_watch::store_watch_task;
