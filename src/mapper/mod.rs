//! Drag-to-duration mapping
//!
//! Converts the running translation of a drag gesture into whole minutes,
//! and back into a handle distance for durations set some other way.

pub mod config;
pub mod duration_mapper;

pub use config::{MapperConfig, MapperConfigError, MAX_MINUTES};
pub use duration_mapper::{AlignmentFeedback, DragReading, DurationMapper};
