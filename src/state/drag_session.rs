//! Time-selection capsule state

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde::Serialize;

use crate::mapper::{DragReading, DurationMapper, MapperConfig, MAX_MINUTES};

/// The expanded capsule: a value being chosen, before it becomes a timer
#[derive(Debug, Clone)]
pub struct DragSession {
    mapper: DurationMapper,
    minutes: u32,
    title: String,
}

/// What a committed capsule turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub minutes: u32,
    pub title: String,
}

/// When a countdown started now would end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndPrediction {
    pub ends_at: DateTime<FixedOffset>,
    pub next_day: bool,
}

impl DragSession {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            mapper: DurationMapper::new(config),
            minutes: 0,
            title: String::new(),
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mapper(&self) -> &DurationMapper {
        &self.mapper
    }

    /// Feed the running translation of the drag
    pub fn drag_to(&mut self, distance: f64) -> DragReading {
        let reading = self.mapper.minutes_for_distance(distance);
        self.minutes = reading.minutes;
        reading
    }

    /// Manual numeric entry; returns the clamped value and the handle
    /// distance that displays it
    pub fn set_minutes(&mut self, minutes: i64) -> (u32, f64) {
        let clamped = minutes.clamp(0, i64::from(MAX_MINUTES));
        self.minutes = clamped as u32;
        (self.minutes, self.mapper.distance_for_minutes(clamped))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn handle_distance(&self) -> f64 {
        self.mapper.distance_for_minutes(i64::from(self.minutes))
    }

    /// Take the capsule value and collapse it. Nothing is committed for
    /// zero minutes, and the capsule is left as is.
    pub fn commit(&mut self) -> Option<Commit> {
        if self.minutes == 0 {
            return None;
        }
        let commit = Commit {
            minutes: self.minutes,
            title: std::mem::take(&mut self.title),
        };
        self.cancel();
        Some(commit)
    }

    pub fn cancel(&mut self) {
        self.minutes = 0;
        self.title.clear();
        self.mapper.reset();
    }
}

/// Predict the end of a countdown of `minutes` started at `now`
pub fn predict_end<Tz: TimeZone>(now: DateTime<Tz>, minutes: u32) -> EndPrediction {
    let now = now.fixed_offset();
    let ends_at = now + Duration::minutes(i64::from(minutes));
    let next_day = ends_at.date_naive() != now.date_naive();
    EndPrediction { ends_at, next_day }
}
