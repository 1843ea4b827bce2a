//! Multi-timer registry
//!
//! Owns every running countdown. All mutation goes through `create`,
//! `tick`/`advance`, `snooze`, `dismiss` and `stop`; readers only ever get
//! [`TimerSnapshot`]s. Operations on unknown ids are no-ops.

use tracing::{debug, info};

use super::running_timer::{RunningTimer, TimerId, TimerSnapshot};
use crate::events::TimerCompleted;

#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: Vec<RunningTimer>,
    next_id: u64,
    last_period: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a running timer with `remaining = total = duration_seconds`
    pub fn create(&mut self, duration_seconds: u64, title: impl Into<String>) -> TimerId {
        self.next_id += 1;
        let id = TimerId::from(self.next_id);
        let title = title.into();

        info!("Creating timer {} ({}s) {:?}", id, duration_seconds, title);
        self.timers.push(RunningTimer::new(id, duration_seconds, title));
        id
    }

    /// Advance every timer by one second.
    ///
    /// Returns one [`TimerCompleted`] per timer whose finished episode has
    /// not been announced yet.
    pub fn tick(&mut self) -> Vec<TimerCompleted> {
        let next = self.last_period + 1;
        self.advance(next)
    }

    /// Tick for clock period `period`, ignoring periods already applied
    pub fn advance(&mut self, period: u64) -> Vec<TimerCompleted> {
        if period <= self.last_period {
            debug!(
                "Ignoring tick for period {} (already at {})",
                period, self.last_period
            );
            return Vec::new();
        }
        self.last_period = period;

        let mut completed = Vec::new();
        for timer in &mut self.timers {
            timer.count_down();
            if let Some(event) = timer.take_completion() {
                info!("Timer {} finished", event.id);
                completed.push(event);
            }
        }
        completed
    }

    /// Re-arm a timer in any state for `extra_minutes`
    pub fn snooze(&mut self, id: TimerId, extra_minutes: u32) -> bool {
        match self.timers.iter_mut().find(|timer| timer.id() == id) {
            Some(timer) => {
                info!("Snoozing timer {} for {} min", id, extra_minutes);
                timer.rearm(u64::from(extra_minutes) * 60);
                true
            }
            None => {
                debug!("Snooze for unknown timer {}", id);
                false
            }
        }
    }

    /// Remove a timer in response to its completion
    pub fn dismiss(&mut self, id: TimerId) -> bool {
        self.remove(id, "dismissed")
    }

    /// Remove a timer at the user's request, in any state
    pub fn stop(&mut self, id: TimerId) -> bool {
        self.remove(id, "stopped")
    }

    /// Dismiss only if the timer is still finished in `episode`.
    ///
    /// Used when an unanswered completion banner times out; a snooze or an
    /// explicit dismiss in the meantime wins.
    pub fn dismiss_unanswered(&mut self, id: TimerId, episode: u32) -> bool {
        let unanswered = self
            .timers
            .iter()
            .any(|timer| timer.id() == id && timer.episode() == episode && timer.is_finished());
        unanswered && self.remove(id, "dismissed after timeout")
    }

    fn remove(&mut self, id: TimerId, reason: &str) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id() != id);
        let removed = self.timers.len() != before;
        if removed {
            info!("Timer {} {}", id, reason);
        } else {
            debug!("Timer {} already gone", id);
        }
        removed
    }

    /// Snapshots in insertion order
    pub fn list(&self) -> Vec<TimerSnapshot> {
        self.timers.iter().map(RunningTimer::snapshot).collect()
    }

    pub fn get(&self, id: TimerId) -> Option<TimerSnapshot> {
        self.timers
            .iter()
            .find(|timer| timer.id() == id)
            .map(RunningTimer::snapshot)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn finished_count(&self) -> usize {
        self.timers.iter().filter(|timer| timer.is_finished()).count()
    }

    pub fn last_period(&self) -> u64 {
        self.last_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerPhase;

    fn ticks(registry: &mut TimerRegistry, n: usize) -> Vec<TimerCompleted> {
        (0..n).flat_map(|_| registry.tick()).collect()
    }

    #[test]
    fn five_ticks_finish_a_five_second_timer() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(5, "eggs");

        let events = ticks(&mut registry, 5);
        let timer = registry.get(id).unwrap();
        assert_eq!(timer.remaining_seconds, 0);
        assert!(timer.is_finished);
        assert_eq!(events.len(), 1);

        let sixth = registry.tick();
        assert!(sixth.is_empty());
        assert_eq!(registry.get(id).unwrap().remaining_seconds, 0);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(1, "");

        let events = ticks(&mut registry, 2);
        assert_eq!(
            events,
            vec![TimerCompleted {
                id,
                title: String::new(),
                total_seconds: 1,
                episode: 0,
            }]
        );
        assert!(registry.get(id).unwrap().has_notified);
    }

    #[test]
    fn snooze_rearms_for_another_episode() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(2, "laundry");
        assert_eq!(ticks(&mut registry, 2).len(), 1);

        assert!(registry.snooze(id, 10));
        let timer = registry.get(id).unwrap();
        assert_eq!(timer.remaining_seconds, 600);
        assert_eq!(timer.total_seconds, 600);
        assert_eq!(timer.phase, TimerPhase::Running);
        assert!(!timer.is_finished);
        assert!(!timer.has_notified);

        assert!(ticks(&mut registry, 599).is_empty());
        let events = ticks(&mut registry, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].episode, 1);
        assert!(ticks(&mut registry, 5).is_empty());
    }

    #[test]
    fn snooze_while_running_resets_duration() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(100, "");
        ticks(&mut registry, 10);
        registry.snooze(id, 1);
        assert_eq!(registry.get(id).unwrap().remaining_seconds, 60);
    }

    #[test]
    fn dismiss_removes_and_is_idempotent() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(1, "");
        ticks(&mut registry, 1);

        assert!(registry.dismiss(id));
        assert!(registry.list().iter().all(|timer| timer.id != id));
        assert!(!registry.dismiss(id));
        assert!(!registry.stop(id));
        assert!(!registry.snooze(id, 5));
    }

    #[test]
    fn concurrent_timers_are_independent() {
        let mut registry = TimerRegistry::new();
        let a = registry.create(3, "a");
        let b = registry.create(10, "b");

        let events = ticks(&mut registry, 3);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, a);

        let a = registry.get(a).unwrap();
        assert!(a.is_finished && a.has_notified);
        let b = registry.get(b).unwrap();
        assert!(!b.is_finished);
        assert_eq!(b.remaining_seconds, 7);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = TimerRegistry::new();
        let first = registry.create(60, "");
        registry.stop(first);
        let second = registry.create(60, "");
        assert_ne!(first, second);
    }

    #[test]
    fn stale_periods_do_not_advance() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(10, "");

        registry.advance(1);
        registry.advance(1);
        registry.advance(0);
        assert_eq!(registry.get(id).unwrap().remaining_seconds, 9);

        registry.advance(2);
        assert_eq!(registry.get(id).unwrap().remaining_seconds, 8);
        assert_eq!(registry.last_period(), 2);
    }

    #[test]
    fn zero_length_timer_finishes_on_first_tick() {
        let mut registry = TimerRegistry::new();
        registry.create(0, "");
        assert_eq!(registry.tick().len(), 1);
        assert!(registry.tick().is_empty());
    }

    #[test]
    fn timeout_dismiss_respects_episode() {
        let mut registry = TimerRegistry::new();
        let id = registry.create(1, "");
        ticks(&mut registry, 1);

        registry.snooze(id, 1);
        // episode 0 banner timed out after the user already snoozed
        assert!(!registry.dismiss_unanswered(id, 0));
        assert_eq!(registry.len(), 1);

        ticks(&mut registry, 60);
        assert!(registry.dismiss_unanswered(id, 1));
        assert!(registry.is_empty());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut registry = TimerRegistry::new();
        let ids: Vec<_> = (1..=3).map(|n| registry.create(n * 60, "")).collect();
        let listed: Vec<_> = registry.list().into_iter().map(|timer| timer.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(registry.list(), registry.list());
    }
}
