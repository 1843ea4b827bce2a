//! Drag distance to duration mapping with magnetic snap plateaus

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::config::{MapperConfig, MAX_MINUTES};

/// Emitted once each time a drag enters a new snap target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentFeedback {
    pub target: u32,
}

/// Result of feeding one drag translation into the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragReading {
    /// Whole minutes shown in the capsule, in `[0, 999]`
    pub minutes: u32,
    /// Snap target the reading is held at, if any
    pub snapped: Option<u32>,
    /// Present only on the first reading inside a new snap target
    pub feedback: Option<AlignmentFeedback>,
}

/// Three-zone piecewise-linear mapper.
///
/// The only state is the last snap target entered, which keeps
/// [`AlignmentFeedback`] from repeating while a drag rests on one plateau.
#[derive(Debug, Clone)]
pub struct DurationMapper {
    config: MapperConfig,
    last_snapped: Option<u32>,
}

impl Default for DurationMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl DurationMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            last_snapped: None,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn last_snapped(&self) -> Option<u32> {
        self.last_snapped
    }

    /// Forget the snap memory, e.g. when a new drag gesture begins
    pub fn reset(&mut self) {
        self.last_snapped = None;
    }

    /// Continuous (pre-rounding) minutes for a drag distance, capped at 999
    pub fn continuous_minutes(&self, distance: f64) -> f64 {
        // NaN.max(0.0) is 0.0
        let distance = distance.max(0.0);
        let c = &self.config;

        let minutes = if distance <= c.zone1_distance {
            distance / c.zone1_distance * c.zone1_minutes
        } else if distance <= c.zone2_distance {
            let progress = (distance - c.zone1_distance) / (c.zone2_distance - c.zone1_distance);
            c.zone1_minutes + progress * (c.zone2_minutes - c.zone1_minutes)
        } else {
            c.zone2_minutes + (distance - c.zone2_distance) / c.zone3_distance_per_minute
        };

        minutes.min(f64::from(MAX_MINUTES))
    }

    /// Map a drag distance to whole minutes, applying snap plateaus
    pub fn minutes_for_distance(&mut self, distance: f64) -> DragReading {
        let raw = self.continuous_minutes(distance);
        let tolerance = self.config.snap_tolerance;

        let snapped = self
            .config
            .snap_targets
            .iter()
            .copied()
            .find(|&target| (raw - f64::from(target)).abs() <= tolerance);

        let minutes = snapped.unwrap_or_else(|| raw.round() as u32);

        let feedback = match snapped {
            Some(target) if self.last_snapped != Some(target) => {
                trace!("Drag entered snap target {} (raw {:.2})", target, raw);
                self.last_snapped = Some(target);
                Some(AlignmentFeedback { target })
            }
            _ => None,
        };

        if !self.config.snap_targets.contains(&minutes) {
            self.last_snapped = None;
        }

        DragReading {
            minutes,
            snapped,
            feedback,
        }
    }

    /// Handle distance that displays `minutes`, ignoring snapping.
    ///
    /// `minutes` is clamped to `[0, 999]` first.
    pub fn distance_for_minutes(&self, minutes: i64) -> f64 {
        let minutes = minutes.clamp(0, i64::from(MAX_MINUTES)) as f64;
        self.distance_for_continuous(minutes)
    }

    fn distance_for_continuous(&self, minutes: f64) -> f64 {
        let c = &self.config;
        if minutes <= c.zone1_minutes {
            minutes / c.zone1_minutes * c.zone1_distance
        } else if minutes <= c.zone2_minutes {
            let progress = (minutes - c.zone1_minutes) / (c.zone2_minutes - c.zone1_minutes);
            c.zone1_distance + progress * (c.zone2_distance - c.zone1_distance)
        } else {
            c.zone2_distance + (minutes - c.zone2_minutes) * c.zone3_distance_per_minute
        }
    }
}
