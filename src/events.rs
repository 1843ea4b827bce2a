//! Events published by the daemon
//!
//! Every state change produces a [`TimerEvent`] on the broadcast channel in
//! [`AppState`](crate::state::AppState). The notifier task and the `/events`
//! stream subscribe to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerId;

/// A timer reached zero; delivered once per finished episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCompleted {
    pub id: TimerId,
    pub title: String,
    pub total_seconds: u64,
    /// Bumped by every snooze, so replies can be matched to this episode
    pub episode: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    TimerCreated {
        id: TimerId,
        title: String,
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted(TimerCompleted),
    TimerSnoozed {
        id: TimerId,
        minutes: u32,
        at: DateTime<Utc>,
    },
    TimerRemoved {
        id: TimerId,
        reason: RemovalReason,
        at: DateTime<Utc>,
    },
    /// The capsule drag entered a new snap target
    AlignmentFeedback { target: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Stopped,
    Dismissed,
    TimedOut,
}

impl TimerEvent {
    /// Name used for the server-sent event field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimerCreated { .. } => "timer_created",
            Self::TimerCompleted(_) => "timer_completed",
            Self::TimerSnoozed { .. } => "timer_snoozed",
            Self::TimerRemoved { .. } => "timer_removed",
            Self::AlignmentFeedback { .. } => "alignment_feedback",
        }
    }
}
