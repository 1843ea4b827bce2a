//! Collaborators outside the timer core
//!
//! Desktop notification delivery and preset persistence.

pub mod notification;
pub mod preset_store;

// Re-export main items
pub use notification::*;
pub use preset_store::PresetStore;
