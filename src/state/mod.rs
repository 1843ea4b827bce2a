//! State management module
//!
//! The timer registry and its entities, the drag capsule, presets, and the
//! shared [`AppState`] that ties them to the event channels.

pub mod app_state;
pub mod drag_session;
pub mod presets;
pub mod registry;
pub mod running_timer;

// Re-export main types
pub use app_state::{AppState, DragState};
pub use drag_session::{predict_end, Commit, DragSession, EndPrediction};
pub use presets::{PresetBook, TimerPreset, CUSTOM_PRESET_TITLE};
pub use registry::TimerRegistry;
pub use running_timer::{format_clock, RunningTimer, TimerId, TimerPhase, TimerSnapshot};
