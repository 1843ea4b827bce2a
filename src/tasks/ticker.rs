//! One-second countdown clock

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that advances every running timer once per second.
///
/// Each interval tick is one second of countdown, keyed by its period since
/// the clock started. Ticks missed while the process was suspended are
/// skipped rather than replayed.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting timer clock");

    let mut clock = interval(Duration::from_secs(1));
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately and marks period 0
    let start = clock.tick().await;

    loop {
        let period = clock.tick().await.duration_since(start).as_secs();

        match state.advance(period) {
            Ok(completed) if !completed.is_empty() => {
                debug!("{} timer(s) finished this tick", completed.len());
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to advance timers: {}", e);
            }
        }
    }
}
