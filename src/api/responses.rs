//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    mapper::DragReading,
    services::NotificationMode,
    state::{EndPrediction, TimerPreset, TimerSnapshot},
};

/// Body of `POST /timers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimerRequest {
    pub minutes: u32,
    #[serde(default)]
    pub title: String,
}

/// Body of `POST /timers/:id/snooze`; omitted minutes use the first option
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnoozeRequest {
    pub minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// `reverse` lists newest first
    pub order: Option<String>,
}

impl ListQuery {
    pub fn is_reverse(&self) -> bool {
        self.order.as_deref() == Some("reverse")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragMoveRequest {
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutesRequest {
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogglePresetRequest {
    pub minutes: u32,
    #[serde(default)]
    pub title: String,
}

/// API response structure for timer mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `ok` when the action changed something, `noop` otherwise
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<TimerSnapshot>,
    pub timers: Vec<TimerSnapshot>,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, timer: Option<TimerSnapshot>, timers: Vec<TimerSnapshot>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
            timers,
        }
    }

    pub fn ok(message: String, timer: Option<TimerSnapshot>, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("ok", message, timer, timers)
    }

    pub fn noop(message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("noop", message, None, timers)
    }

    /// `ok` or `noop` depending on whether the action applied
    pub fn applied(applied: bool, message: String, timer: Option<TimerSnapshot>, timers: Vec<TimerSnapshot>) -> Self {
        if applied {
            Self::ok(message, timer, timers)
        } else {
            Self::noop(message, timers)
        }
    }
}

/// Reading for one drag step, with the capsule's end-time hint
#[derive(Debug, Clone, Serialize)]
pub struct DragResponse {
    pub minutes: u32,
    pub snapped: Option<u32>,
    /// True on the first reading inside a new snap target
    pub alignment_feedback: bool,
    pub handle_distance: f64,
    pub prediction: Option<EndPrediction>,
}

impl DragResponse {
    pub fn new(reading: DragReading, handle_distance: f64, prediction: Option<EndPrediction>) -> Self {
        Self {
            minutes: reading.minutes,
            snapped: reading.snapped,
            alignment_feedback: reading.feedback.is_some(),
            handle_distance,
            prediction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DragStateResponse {
    pub minutes: u32,
    pub title: String,
    pub handle_distance: f64,
    pub is_favorite: bool,
    pub prediction: Option<EndPrediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResponse {
    /// Minutes after clamping to `[0, 999]`
    pub minutes: u32,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetResponse {
    pub status: String,
    /// After a toggle: whether the value is now a favorite
    pub favorite: Option<bool>,
    pub presets: Vec<TimerPreset>,
}

/// Daemon status with timer counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running_timers: usize,
    pub finished_timers: usize,
    pub snooze_options: Vec<u32>,
    pub notification: NotificationMode,
    pub banner_timeout_seconds: Option<u64>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
