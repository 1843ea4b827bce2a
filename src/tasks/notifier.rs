//! Completion notification dispatch

use std::sync::Arc;
use tokio::{sync::broadcast::error::RecvError, time::sleep};
use tracing::{error, info, warn};

use crate::{
    events::{TimerCompleted, TimerEvent},
    services::{
        notification_title, send_system_notification, NotificationMode, NOTIFICATION_SUBTITLE,
    },
    state::AppState,
};

/// Background task that announces finished timers.
///
/// Every `TimerCompleted` is announced according to the configured mode.
/// With a banner timeout, a completion that gets neither a snooze nor a
/// dismiss in time is dismissed on the user's behalf.
pub async fn notifier_task(state: Arc<AppState>) {
    info!(
        "Starting notifier ({:?} mode, snooze options {:?})",
        state.settings.notification, state.settings.snooze_options
    );

    let mut events = state.subscribe();

    loop {
        match events.recv().await {
            Ok(TimerEvent::TimerCompleted(completed)) => {
                // a slow notification program must not hold up later events
                schedule_timeout(&state, &completed);
                tokio::spawn(announce(Arc::clone(&state), completed));
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                // completions are also visible as finished timers in /timers
                warn!("Notifier lagged behind by {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping notifier");
                break;
            }
        }
    }
}

async fn announce(state: Arc<AppState>, completed: TimerCompleted) {
    let title = notification_title(&completed.title);
    info!(
        "Timer {} finished: {} ({} min)",
        completed.id,
        title,
        completed.total_seconds / 60
    );

    if state.settings.notification == NotificationMode::System {
        // delivery failures are not retried; the timer stays finished
        if let Err(e) = send_system_notification(
            state.settings.notify_command.as_deref(),
            title,
            NOTIFICATION_SUBTITLE,
        )
        .await
        {
            warn!("Failed to deliver notification for {}: {}", completed.id, e);
        }
    }
}

fn schedule_timeout(state: &Arc<AppState>, completed: &TimerCompleted) {
    let Some(timeout) = state.settings.banner_timeout else {
        return;
    };

    let state = Arc::clone(state);
    let (id, episode) = (completed.id, completed.episode);
    tokio::spawn(async move {
        sleep(timeout).await;
        match state.dismiss_unanswered(id, episode) {
            Ok(true) => info!("Timer {} dismissed after {:?} without reply", id, timeout),
            Ok(false) => {}
            Err(e) => error!("Failed to dismiss timer {}: {}", id, e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::{config::TimerSettings, services::PresetStore};

    fn state_with_timeout(seconds: u64) -> Arc<AppState> {
        state_with(TimerSettings {
            banner_timeout: Some(Duration::from_secs(seconds)),
            ..TimerSettings::default()
        })
    }

    fn state_with(settings: TimerSettings) -> Arc<AppState> {
        Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings, PresetStore::in_memory()))
    }

    fn finish(state: &AppState, minutes: u32) -> crate::state::TimerId {
        let id = state.create_timer(minutes, "").unwrap().id;
        for _ in 0..minutes * 60 {
            state.tick().unwrap();
        }
        id
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_completion_is_dismissed() {
        let state = state_with_timeout(30);
        let handle = tokio::spawn(notifier_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        let id = finish(&state, 1);
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(state.get_timer(id).unwrap().is_none());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn snooze_beats_the_timeout() {
        let state = state_with_timeout(30);
        let handle = tokio::spawn(notifier_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        let id = finish(&state, 1);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(state.snooze(id, Some(5)).unwrap());
        tokio::time::sleep(Duration::from_secs(30)).await;

        let timer = state.get_timer(id).unwrap().unwrap();
        assert!(!timer.is_finished);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_notification_program_does_not_block_timeouts() {
        // `sh <script> <subtitle>` runs the timer title as a script
        let script = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(script.path(), "sleep 3600\n").unwrap();
        let title = script.path().to_string_lossy().into_owned();

        let state = state_with(TimerSettings {
            banner_timeout: Some(Duration::from_secs(30)),
            notification: NotificationMode::System,
            notify_command: Some("sh".to_string()),
            ..TimerSettings::default()
        });
        let handle = tokio::spawn(notifier_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        let first = state.create_timer(1, title.clone()).unwrap().id;
        let second = state.create_timer(1, title).unwrap().id;
        for _ in 0..60 {
            state.tick().unwrap();
        }
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(state.get_timer(first).unwrap().is_none());
        assert!(state.get_timer(second).unwrap().is_none());
        handle.abort();
    }
}
