//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    Commit, DragSession, PresetBook, TimerId, TimerPreset, TimerRegistry, TimerSnapshot,
};
use crate::{
    config::TimerSettings,
    error::{AppError, AppResult},
    events::{RemovalReason, TimerCompleted, TimerEvent},
    mapper::{DragReading, MAX_MINUTES},
    services::PresetStore,
};

/// Capsule state as shown to front-ends
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DragState {
    pub minutes: u32,
    pub title: String,
    pub handle_distance: f64,
    pub is_favorite: bool,
}

/// Shared state behind every API handler and background task.
///
/// Each mutex guards one resource and is never held while another is
/// taken. Events are published after the guard is released.
#[derive(Debug)]
pub struct AppState {
    /// Running timers
    pub registry: Arc<Mutex<TimerRegistry>>,
    /// Time-selection capsule
    pub drag: Arc<Mutex<DragSession>>,
    /// Favorite presets and where they are saved
    pub presets: Arc<Mutex<PresetBook>>,
    preset_store: PresetStore,
    /// Serializes preset file writes
    preset_save: Mutex<()>,
    /// Snooze options, banner timeout, notification mode
    pub settings: TimerSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Timer and capsule events
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest timer snapshots for renderers
    pub snapshot_tx: watch::Sender<Vec<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Vec<TimerSnapshot>>,
}

impl AppState {
    pub fn new(port: u16, host: String, settings: TimerSettings, preset_store: PresetStore) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());
        let presets = preset_store.load_or_default();

        Self {
            registry: Arc::new(Mutex::new(TimerRegistry::new())),
            drag: Arc::new(Mutex::new(DragSession::new(settings.mapper.clone()))),
            presets: Arc::new(Mutex::new(presets)),
            preset_store,
            preset_save: Mutex::new(()),
            settings,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// State with default settings and no preset file
    pub fn in_memory() -> Self {
        Self::new(0, "127.0.0.1".to_string(), TimerSettings::default(), PresetStore::in_memory())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    fn lock_registry(&self) -> AppResult<MutexGuard<'_, TimerRegistry>> {
        self.registry
            .lock()
            .map_err(|_| AppError::LockPoisoned("timer registry"))
    }

    fn lock_drag(&self) -> AppResult<MutexGuard<'_, DragSession>> {
        self.drag
            .lock()
            .map_err(|_| AppError::LockPoisoned("drag session"))
    }

    fn lock_presets(&self) -> AppResult<MutexGuard<'_, PresetBook>> {
        self.presets
            .lock()
            .map_err(|_| AppError::LockPoisoned("presets"))
    }

    fn publish(&self, event: TimerEvent) {
        if let Err(e) = self.event_tx.send(event) {
            debug!("No event subscribers: {}", e);
        }
    }

    fn publish_snapshots(&self, snapshots: Vec<TimerSnapshot>) {
        if let Err(e) = self.snapshot_tx.send(snapshots) {
            warn!("Failed to send timer snapshots: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Start a countdown of `minutes` (clamped to 999)
    pub fn create_timer(&self, minutes: u32, title: impl Into<String>) -> AppResult<TimerSnapshot> {
        let minutes = minutes.min(MAX_MINUTES);
        let mut registry = self.lock_registry()?;
        let id = registry.create(u64::from(minutes) * 60, title);
        let snapshots = registry.list();
        drop(registry);

        let created = snapshots
            .iter()
            .find(|timer| timer.id == id)
            .cloned()
            .ok_or(AppError::TimerVanished(id))?;

        self.record_action("create");
        self.publish(TimerEvent::TimerCreated {
            id,
            title: created.title.clone(),
            total_seconds: created.total_seconds,
            at: Utc::now(),
        });
        self.publish_snapshots(snapshots);
        Ok(created)
    }

    /// Advance all timers by one second and announce completions
    pub fn tick(&self) -> AppResult<Vec<TimerCompleted>> {
        self.count_down(TimerRegistry::tick)
    }

    /// Tick for clock period `period`; periods already applied advance nothing
    pub fn advance(&self, period: u64) -> AppResult<Vec<TimerCompleted>> {
        self.count_down(|registry| registry.advance(period))
    }

    fn count_down<F>(&self, step: F) -> AppResult<Vec<TimerCompleted>>
    where
        F: FnOnce(&mut TimerRegistry) -> Vec<TimerCompleted>,
    {
        let mut registry = self.lock_registry()?;
        if registry.is_empty() {
            return Ok(Vec::new());
        }
        let completed = step(&mut *registry);
        let snapshots = registry.list();
        drop(registry);

        for event in &completed {
            self.publish(TimerEvent::TimerCompleted(event.clone()));
        }
        self.publish_snapshots(snapshots);
        Ok(completed)
    }

    /// Re-arm a timer; `None` uses the first configured snooze option
    pub fn snooze(&self, id: TimerId, minutes: Option<u32>) -> AppResult<bool> {
        let minutes = minutes
            .unwrap_or_else(|| self.settings.default_snooze_minutes())
            .min(MAX_MINUTES);

        let mut registry = self.lock_registry()?;
        let applied = registry.snooze(id, minutes);
        let snapshots = registry.list();
        drop(registry);

        if applied {
            self.record_action("snooze");
            self.publish(TimerEvent::TimerSnoozed {
                id,
                minutes,
                at: Utc::now(),
            });
            self.publish_snapshots(snapshots);
        }
        Ok(applied)
    }

    pub fn dismiss(&self, id: TimerId) -> AppResult<bool> {
        self.remove(id, RemovalReason::Dismissed, |registry| registry.dismiss(id))
    }

    pub fn stop(&self, id: TimerId) -> AppResult<bool> {
        self.remove(id, RemovalReason::Stopped, |registry| registry.stop(id))
    }

    /// Dismiss a completion nobody answered within the banner timeout
    pub fn dismiss_unanswered(&self, id: TimerId, episode: u32) -> AppResult<bool> {
        self.remove(id, RemovalReason::TimedOut, |registry| {
            registry.dismiss_unanswered(id, episode)
        })
    }

    fn remove<F>(&self, id: TimerId, reason: RemovalReason, remover: F) -> AppResult<bool>
    where
        F: FnOnce(&mut TimerRegistry) -> bool,
    {
        let mut registry = self.lock_registry()?;
        let removed = remover(&mut *registry);
        let snapshots = registry.list();
        drop(registry);

        if removed {
            self.record_action(match reason {
                RemovalReason::Stopped => "stop",
                RemovalReason::Dismissed => "dismiss",
                RemovalReason::TimedOut => "timeout",
            });
            self.publish(TimerEvent::TimerRemoved {
                id,
                reason,
                at: Utc::now(),
            });
            self.publish_snapshots(snapshots);
        }
        Ok(removed)
    }

    /// Timers in insertion order, or newest first when `reverse`
    pub fn list_timers(&self, reverse: bool) -> AppResult<Vec<TimerSnapshot>> {
        let mut timers = self.lock_registry()?.list();
        if reverse {
            timers.reverse();
        }
        Ok(timers)
    }

    pub fn get_timer(&self, id: TimerId) -> AppResult<Option<TimerSnapshot>> {
        Ok(self.lock_registry()?.get(id))
    }

    /// (running, finished) counts
    pub fn timer_counts(&self) -> AppResult<(usize, usize)> {
        let registry = self.lock_registry()?;
        let finished = registry.finished_count();
        Ok((registry.len() - finished, finished))
    }

    // ── Capsule ──────────────────────────────────────────────────────

    pub fn drag_move(&self, distance: f64) -> AppResult<DragReading> {
        let reading = self.lock_drag()?.drag_to(distance);
        if let Some(feedback) = reading.feedback {
            self.publish(TimerEvent::AlignmentFeedback {
                target: feedback.target,
            });
        }
        Ok(reading)
    }

    /// Manual minute entry; returns the clamped minutes and handle distance
    pub fn drag_set_minutes(&self, minutes: i64) -> AppResult<(u32, f64)> {
        Ok(self.lock_drag()?.set_minutes(minutes))
    }

    /// Handle distance that displays `minutes`, without touching the capsule
    pub fn distance_for_minutes(&self, minutes: i64) -> AppResult<(u32, f64)> {
        let clamped = minutes.clamp(0, i64::from(MAX_MINUTES)) as u32;
        let distance = self.lock_drag()?.mapper().distance_for_minutes(minutes);
        Ok((clamped, distance))
    }

    pub fn drag_set_title(&self, title: String) -> AppResult<()> {
        self.lock_drag()?.set_title(title);
        Ok(())
    }

    pub fn drag_state(&self) -> AppResult<DragState> {
        let drag = self.lock_drag()?;
        let (minutes, title, handle_distance) =
            (drag.minutes(), drag.title().to_string(), drag.handle_distance());
        drop(drag);

        let is_favorite = self.lock_presets()?.is_favorite(minutes, &title);
        Ok(DragState {
            minutes,
            title,
            handle_distance,
            is_favorite,
        })
    }

    /// Turn the capsule into a running timer. `None` when it shows zero.
    pub fn drag_commit(&self) -> AppResult<Option<TimerSnapshot>> {
        let commit = self.lock_drag()?.commit();
        match commit {
            Some(Commit { minutes, title }) => self.create_timer(minutes, title).map(Some),
            None => {
                debug!("Ignoring commit of an empty capsule");
                Ok(None)
            }
        }
    }

    pub fn drag_cancel(&self) -> AppResult<()> {
        self.lock_drag()?.cancel();
        Ok(())
    }

    /// Favorite or un-favorite the capsule's current value
    pub fn drag_toggle_favorite(&self) -> AppResult<Option<bool>> {
        let drag = self.lock_drag()?;
        let (minutes, title) = (drag.minutes(), drag.title().to_string());
        drop(drag);
        self.toggle_preset(minutes, &title)
    }

    // ── Presets ──────────────────────────────────────────────────────

    pub fn list_presets(&self) -> AppResult<Vec<TimerPreset>> {
        Ok(self.lock_presets()?.list().to_vec())
    }

    pub fn toggle_preset(&self, minutes: u32, title: &str) -> AppResult<Option<bool>> {
        let toggled = self
            .lock_presets()?
            .toggle(minutes.min(MAX_MINUTES), title);
        if toggled.is_some() {
            self.persist_presets()?;
            self.record_action("toggle-preset");
        }
        Ok(toggled)
    }

    pub fn delete_preset(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.lock_presets()?.delete(id);
        if deleted {
            self.persist_presets()?;
            self.record_action("delete-preset");
        }
        Ok(deleted)
    }

    /// Start a timer from a preset; `None` for an unknown preset
    pub fn start_preset(&self, id: Uuid) -> AppResult<Option<TimerSnapshot>> {
        let preset = self.lock_presets()?.get(id).cloned();
        let Some(preset) = preset else {
            return Ok(None);
        };

        info!("Starting preset {} ({} min)", preset.title, preset.minutes);
        // selecting a preset also collapses the capsule
        self.drag_cancel()?;
        self.create_timer(preset.minutes, preset.title).map(Some)
    }

    /// Write the current list without holding the preset lock. Writers are
    /// serialized and each one saves the latest list, so the file never
    /// ends on an older state.
    fn persist_presets(&self) -> AppResult<()> {
        let _saving = self
            .preset_save
            .lock()
            .map_err(|_| AppError::LockPoisoned("preset file"))?;
        let presets = self.list_presets()?;

        if let Err(e) = self.preset_store.save(&presets) {
            warn!("Failed to save presets: {}", e);
        }
        Ok(())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_clamps_and_publishes() {
        let state = AppState::in_memory();
        let mut events = state.subscribe();

        let timer = state.create_timer(5000, "long").unwrap();
        assert_eq!(timer.total_seconds, 999 * 60);
        assert!(matches!(
            events.try_recv().unwrap(),
            TimerEvent::TimerCreated { .. }
        ));
        assert_eq!(state.snapshot_tx.borrow().len(), 1);
        assert_eq!(state.get_last_action().0.as_deref(), Some("create"));
    }

    #[test]
    fn completion_reaches_subscribers_once() {
        let state = AppState::in_memory();
        let id = state.create_timer(1, "").unwrap().id;
        let mut events = state.subscribe();

        for _ in 0..61 {
            state.tick().unwrap();
        }

        let completed: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|event| match event {
                TimerEvent::TimerCompleted(done) => Some(done),
                _ => None,
            })
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, id);
    }

    #[test]
    fn snooze_defaults_to_first_option() {
        let state = AppState::in_memory();
        let id = state.create_timer(1, "").unwrap().id;
        assert!(state.snooze(id, None).unwrap());
        let timer = state.get_timer(id).unwrap().unwrap();
        assert_eq!(
            timer.total_seconds,
            u64::from(state.settings.default_snooze_minutes()) * 60
        );
    }

    #[test]
    fn unknown_ids_are_noops() {
        let state = AppState::in_memory();
        let ghost = TimerId::from(42);
        assert!(!state.snooze(ghost, Some(5)).unwrap());
        assert!(!state.dismiss(ghost).unwrap());
        assert!(!state.stop(ghost).unwrap());
        assert!(state.get_timer(ghost).unwrap().is_none());
    }

    #[test]
    fn list_can_be_reversed() {
        let state = AppState::in_memory();
        let first = state.create_timer(1, "first").unwrap().id;
        let second = state.create_timer(2, "second").unwrap().id;

        let forward: Vec<_> = state.list_timers(false).unwrap().iter().map(|t| t.id).collect();
        let reversed: Vec<_> = state.list_timers(true).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(forward, vec![first, second]);
        assert_eq!(reversed, vec![second, first]);
    }

    #[test]
    fn drag_feedback_is_published() {
        let state = AppState::in_memory();
        let mut events = state.subscribe();

        state.drag_move(200.0).unwrap();
        state.drag_move(201.0).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            TimerEvent::AlignmentFeedback { target: 15 }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn drag_commit_creates_timer() {
        let state = AppState::in_memory();
        assert!(state.drag_commit().unwrap().is_none());

        state.drag_move(400.0).unwrap();
        state.drag_set_title("meeting".to_string()).unwrap();
        let timer = state.drag_commit().unwrap().unwrap();
        assert_eq!(timer.total_seconds, 3600);
        assert_eq!(timer.title, "meeting");
        assert_eq!(state.drag_state().unwrap().minutes, 0);
    }

    #[test]
    fn favorite_toggle_reflects_in_drag_state() {
        let state = AppState::in_memory();
        state.drag_set_minutes(12).unwrap();
        assert!(!state.drag_state().unwrap().is_favorite);

        assert_eq!(state.drag_toggle_favorite().unwrap(), Some(true));
        assert!(state.drag_state().unwrap().is_favorite);
        assert_eq!(state.drag_toggle_favorite().unwrap(), Some(false));
    }

    #[test]
    fn start_preset_creates_timer() {
        let state = AppState::in_memory();
        let preset = state.list_presets().unwrap()[2].clone();
        let timer = state.start_preset(preset.id).unwrap().unwrap();
        assert_eq!(timer.total_seconds, u64::from(preset.minutes) * 60);
        assert_eq!(timer.title, preset.title);
        assert!(state.start_preset(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn timeout_dismiss_publishes_reason() {
        let state = AppState::in_memory();
        let id = state.create_timer(1, "").unwrap().id;
        for _ in 0..60 {
            state.tick().unwrap();
        }
        let mut events = state.subscribe();

        assert!(state.dismiss_unanswered(id, 0).unwrap());
        assert!(matches!(
            events.try_recv().unwrap(),
            TimerEvent::TimerRemoved {
                reason: RemovalReason::TimedOut,
                ..
            }
        ));
        assert_eq!(state.timer_counts().unwrap(), (0, 0));
    }

    #[test]
    fn repeated_clock_period_counts_once() {
        let state = AppState::in_memory();
        let id = state.create_timer(1, "").unwrap().id;

        state.advance(1).unwrap();
        state.advance(1).unwrap();
        state.advance(2).unwrap();
        state.advance(2).unwrap();

        assert_eq!(state.get_timer(id).unwrap().unwrap().remaining_seconds, 58);
    }

    #[test]
    fn preset_file_ends_on_latest_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("presets.json"));
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            TimerSettings::default(),
            store.clone(),
        ));

        let workers: Vec<_> = (0..4u32)
            .map(|worker| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for minutes in 1..=20 {
                        state.toggle_preset(100 + worker * 20 + minutes, "").unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        let first = state.list_presets().unwrap()[0].id;
        assert!(state.delete_preset(first).unwrap());

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, state.list_presets().unwrap());
        assert_eq!(saved.len(), 4 + 80 - 1);
        assert!(state.presets.try_lock().is_ok());
    }
}
