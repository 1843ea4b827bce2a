//! Zone and snapping constants for the drag mapper

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest duration, in minutes, the capsule can express
pub const MAX_MINUTES: u32 = 999;

/// Invalid mapper configuration
#[derive(Debug, Error, PartialEq)]
pub enum MapperConfigError {
    #[error("zone boundaries must be increasing (zone1={zone1}, zone2={zone2})")]
    ZoneOrder { zone1: f64, zone2: f64 },

    #[error("zone minutes must be increasing and positive (zone1={zone1}, zone2={zone2})")]
    MinuteOrder { zone1: f64, zone2: f64 },

    #[error("distance per minute must be positive, got {0}")]
    Density(f64),

    #[error("snap tolerance must be in [0, 0.5) of the target spacing, got {0}")]
    Tolerance(f64),
}

/// Piecewise-linear mapping constants.
///
/// Zone 1 covers `[0, zone1_distance]` and maps to `[0, zone1_minutes]`,
/// zone 2 covers `(zone1_distance, zone2_distance]` and maps to
/// `(zone1_minutes, zone2_minutes]`, zone 3 continues linearly at
/// `zone3_distance_per_minute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    pub zone1_distance: f64,
    pub zone1_minutes: f64,
    pub zone2_distance: f64,
    pub zone2_minutes: f64,
    pub zone3_distance_per_minute: f64,
    /// Snap targets in ascending order
    pub snap_targets: Vec<u32>,
    /// Half-width of each snap plateau, in continuous minutes
    pub snap_tolerance: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            zone1_distance: 200.0,
            zone1_minutes: 15.0,
            zone2_distance: 400.0,
            zone2_minutes: 60.0,
            zone3_distance_per_minute: 5.0,
            snap_targets: vec![5, 10, 15, 30, 45, 60],
            snap_tolerance: 0.8,
        }
    }
}

impl MapperConfig {
    /// Replace the snap targets, keeping them sorted and unique
    pub fn with_snap_targets(mut self, mut targets: Vec<u32>) -> Self {
        targets.sort_unstable();
        targets.dedup();
        self.snap_targets = targets;
        self
    }

    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    /// Check that the zones stack into a continuous, strictly increasing
    /// mapping and that snap plateaus cannot overlap.
    pub fn validate(&self) -> Result<(), MapperConfigError> {
        if !(self.zone1_distance > 0.0 && self.zone2_distance > self.zone1_distance) {
            return Err(MapperConfigError::ZoneOrder {
                zone1: self.zone1_distance,
                zone2: self.zone2_distance,
            });
        }
        if !(self.zone1_minutes > 0.0 && self.zone2_minutes > self.zone1_minutes) {
            return Err(MapperConfigError::MinuteOrder {
                zone1: self.zone1_minutes,
                zone2: self.zone2_minutes,
            });
        }
        if !(self.zone3_distance_per_minute > 0.0) {
            return Err(MapperConfigError::Density(self.zone3_distance_per_minute));
        }

        let min_gap = self
            .snap_targets
            .windows(2)
            .map(|pair| f64::from(pair[1] - pair[0]))
            .fold(f64::INFINITY, f64::min);
        if !(self.snap_tolerance >= 0.0) || self.snap_tolerance * 2.0 >= min_gap {
            return Err(MapperConfigError::Tolerance(self.snap_tolerance));
        }

        Ok(())
    }
}
