//! Background tasks module
//!
//! The countdown clock and the completion notifier run alongside the HTTP
//! server.

pub mod notifier;
pub mod ticker;

// Re-export main functions
pub use notifier::notifier_task;
pub use ticker::ticker_task;
