//! Flux Timer - A floating countdown timer daemon
//!
//! Durations are chosen by dragging a capsule whose distance maps onto
//! minutes through three zones with magnetic snap plateaus. Any number of
//! timers count down concurrently; finished ones are announced once and can
//! be snoozed or dismissed over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod mapper;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, TimerSettings};
pub use error::{AppError, AppResult};
pub use events::{TimerCompleted, TimerEvent};
pub use mapper::{DurationMapper, MapperConfig};
pub use state::{AppState, TimerId, TimerRegistry};
pub use utils::signals::shutdown_signal;
