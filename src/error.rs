//! Error types for the daemon's ambient concerns.
//!
//! The timer core itself never fails. [`AppError`] covers shared-state
//! failures surfaced to handlers; [`PresetStoreError`] covers the preset
//! file, whose failures are logged rather than returned.

use std::path::PathBuf;

use thiserror::Error;

use crate::state::TimerId;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to lock {0}")]
    LockPoisoned(&'static str),

    #[error("Timer {0} disappeared while being created")]
    TimerVanished(TimerId),
}

#[derive(Debug, Error)]
pub enum PresetStoreError {
    #[error("Failed to access preset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed preset file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_errors_name_the_file() {
        let error = PresetStoreError::Io {
            path: PathBuf::from("/tmp/presets.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.to_string().contains("/tmp/presets.json"));
        assert_eq!(
            AppError::LockPoisoned("presets").to_string(),
            "Failed to lock presets"
        );
    }
}
