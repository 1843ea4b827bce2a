//! JSON persistence for favorite presets

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    error::PresetStoreError,
    state::{PresetBook, TimerPreset},
};

/// Reads and writes the preset list. Without a path it keeps nothing on
/// disk.
#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    path: Option<PathBuf>,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load saved presets; `Ok(None)` when nothing has been saved yet
    pub fn load(&self) -> Result<Option<Vec<TimerPreset>>, PresetStoreError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            debug!("No preset file at {}", path.display());
            return Ok(None);
        }

        let data = fs::read(path).map_err(|source| PresetStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let presets = serde_json::from_slice(&data).map_err(|source| PresetStoreError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Some(presets))
    }

    /// Load saved presets, falling back to the built-in defaults
    pub fn load_or_default(&self) -> PresetBook {
        match self.load() {
            Ok(Some(presets)) => {
                info!("Loaded {} presets", presets.len());
                PresetBook::new(presets)
            }
            Ok(None) => PresetBook::default(),
            Err(e) => {
                warn!("{}, using default presets", e);
                PresetBook::default()
            }
        }
    }

    pub fn save(&self, presets: &[TimerPreset]) -> Result<(), PresetStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PresetStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let data = serde_json::to_vec_pretty(presets).map_err(|source| PresetStoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, data).map_err(|source| PresetStoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Saved {} presets to {}", presets.len(), path.display());
        Ok(())
    }
}
