//! Running timer entity and its read-only snapshot

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::TimerCompleted;

/// Registry-assigned timer identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for TimerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a timer is in its countdown.
///
/// ```text
/// Running -> FinishedPendingNotify -> FinishedNotified
///    ^                                      |
///    +--------------- snooze ---------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Running,
    FinishedPendingNotify,
    FinishedNotified,
}

#[derive(Debug, Clone)]
pub struct RunningTimer {
    id: TimerId,
    title: String,
    total_seconds: u64,
    remaining_seconds: u64,
    phase: TimerPhase,
    episode: u32,
    created_at: DateTime<Utc>,
}

impl RunningTimer {
    pub(crate) fn new(id: TimerId, duration_seconds: u64, title: String) -> Self {
        Self {
            id,
            title,
            total_seconds: duration_seconds,
            remaining_seconds: duration_seconds,
            phase: TimerPhase::Running,
            episode: 0,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            TimerPhase::FinishedPendingNotify | TimerPhase::FinishedNotified
        )
    }

    pub fn has_notified(&self) -> bool {
        self.phase == TimerPhase::FinishedNotified
    }

    /// Advance one second. Finished timers stay at zero.
    pub(crate) fn count_down(&mut self) {
        if self.phase != TimerPhase::Running {
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = TimerPhase::FinishedPendingNotify;
        }
    }

    /// Mark a pending completion as delivered and build its event
    pub(crate) fn take_completion(&mut self) -> Option<TimerCompleted> {
        if self.phase != TimerPhase::FinishedPendingNotify {
            return None;
        }
        self.phase = TimerPhase::FinishedNotified;
        Some(TimerCompleted {
            id: self.id,
            title: self.title.clone(),
            total_seconds: self.total_seconds,
            episode: self.episode,
        })
    }

    /// Reset both durations and start a new episode
    pub(crate) fn rearm(&mut self, duration_seconds: u64) {
        self.total_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.phase = TimerPhase::Running;
        self.episode = self.episode.wrapping_add(1);
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let progress = if self.total_seconds == 0 {
            0.0
        } else {
            self.remaining_seconds as f64 / self.total_seconds as f64
        };

        TimerSnapshot {
            id: self.id,
            title: self.title.clone(),
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            total_minutes: self.total_seconds / 60,
            phase: self.phase,
            is_finished: self.is_finished(),
            has_notified: self.has_notified(),
            episode: self.episode,
            progress,
            display: format_clock(self.remaining_seconds),
            created_at: self.created_at,
        }
    }
}

/// Immutable view of a timer handed to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub title: String,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub total_minutes: u64,
    pub phase: TimerPhase,
    pub is_finished: bool,
    pub has_notified: bool,
    pub episode: u32,
    /// Remaining over total, 0 for a zero-length timer
    pub progress: f64,
    /// `MM:SS`; minutes are not wrapped into hours
    pub display: String,
    pub created_at: DateTime<Utc>,
}

pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
