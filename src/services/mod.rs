//! External collaborator module
//! 
//! This module contains the persistence store, the persisted record codec
//! and alert playback.

pub mod alerts;
pub mod record;
pub mod store;

// Re-export main types
pub use alerts::{AlertPlayer, Tone, Waveform};
pub use store::{FileStore, MemoryStore, StateStore};
