//! Favorite timer presets

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Title used when a favorite is saved without one
pub const CUSTOM_PRESET_TITLE: &str = "Custom";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPreset {
    pub id: Uuid,
    pub minutes: u32,
    pub title: String,
}

impl TimerPreset {
    pub fn new(minutes: u32, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            minutes,
            title: title.into(),
        }
    }
}

/// Ordered list of presets shown under the capsule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetBook {
    presets: Vec<TimerPreset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self::new(vec![
            TimerPreset::new(1, "1m test"),
            TimerPreset::new(5, "Take a break"),
            TimerPreset::new(25, "Pomodoro focus"),
            TimerPreset::new(3, "Instant noodles"),
        ])
    }
}

fn effective_title(title: &str) -> &str {
    if title.is_empty() {
        CUSTOM_PRESET_TITLE
    } else {
        title
    }
}

impl PresetBook {
    pub fn new(presets: Vec<TimerPreset>) -> Self {
        Self { presets }
    }

    pub fn list(&self) -> &[TimerPreset] {
        &self.presets
    }

    pub fn get(&self, id: Uuid) -> Option<&TimerPreset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    pub fn is_favorite(&self, minutes: u32, title: &str) -> bool {
        let title = effective_title(title);
        self.presets
            .iter()
            .any(|preset| preset.minutes == minutes && preset.title == title)
    }

    /// Favorite or un-favorite `minutes`/`title`.
    ///
    /// Returns `Some(true)` when a preset was added, `Some(false)` when one
    /// was removed, and `None` for a zero duration.
    pub fn toggle(&mut self, minutes: u32, title: &str) -> Option<bool> {
        if minutes == 0 {
            return None;
        }
        let title = effective_title(title);

        match self
            .presets
            .iter()
            .position(|preset| preset.minutes == minutes && preset.title == title)
        {
            Some(index) => {
                let removed = self.presets.remove(index);
                info!("Removed preset {} ({} min)", removed.title, removed.minutes);
                Some(false)
            }
            None => {
                info!("Added preset {} ({} min)", title, minutes);
                self.presets.push(TimerPreset::new(minutes, title));
                Some(true)
            }
        }
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.presets.len();
        self.presets.retain(|preset| preset.id != id);
        self.presets.len() != before
    }
}
