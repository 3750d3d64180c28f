//! In-memory store of active timers and finished-timer history

use chrono::Utc;
use tracing::debug;

use super::timer_state::{TickOutcome, Timer};

/// Canonical set of timers.
///
/// A timer lives in exactly one of two collections: the active set
/// (running or paused, in creation order) or the history log (stopped or
/// completed, in the order they finished). The store trusts its callers;
/// input validation happens in the command service.
#[derive(Debug, Default)]
pub struct TimerStore {
    active: Vec<Timer>,
    history: Vec<Timer>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new running timer and return a snapshot of it
    pub fn create(&mut self, name: impl Into<String>, duration_seconds: u32) -> Timer {
        let timer = Timer::new(name, duration_seconds);
        debug!("Created timer {} ({}s)", timer.id, duration_seconds);
        self.active.push(timer.clone());
        timer
    }

    pub fn pause(&mut self, id: &str) -> bool {
        self.find_mut(id).map(Timer::pause).unwrap_or(false)
    }

    pub fn resume(&mut self, id: &str) -> bool {
        self.find_mut(id).map(Timer::resume).unwrap_or(false)
    }

    /// Stop a running or paused timer and move it into history
    pub fn stop(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if !self.active[index].stop(Utc::now()) {
            return false;
        }
        self.retire(index);
        true
    }

    /// Apply one second to a timer. Returns true if the timer counted down.
    pub fn tick(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        match self.active[index].tick(Utc::now()) {
            TickOutcome::Idle => false,
            TickOutcome::Counted => true,
            TickOutcome::Completed => {
                self.retire(index);
                true
            }
        }
    }

    /// Tick every running timer once. Returns the timers completed by this
    /// pass.
    pub fn tick_all(&mut self) -> Vec<Timer> {
        let running: Vec<String> = self
            .active
            .iter()
            .filter(|timer| timer.is_running())
            .map(|timer| timer.id.clone())
            .collect();

        let history_before = self.history.len();
        for id in &running {
            self.tick(id);
        }
        self.history[history_before..].to_vec()
    }

    /// Snapshot of the active set in creation order
    pub fn list_active(&self) -> Vec<Timer> {
        self.active.clone()
    }

    /// Up to `limit` history entries, most recently finished first
    pub fn list_history(&self, limit: usize) -> Vec<Timer> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Timer> {
        self.active
            .iter()
            .find(|timer| timer.id == id)
            .cloned()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|timer| timer.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Timer> {
        self.active.iter_mut().find(|timer| timer.id == id)
    }

    fn retire(&mut self, index: usize) {
        let timer = self.active.remove(index);
        debug!("Timer {} moved to history as {}", timer.id, timer.status);
        self.history.push(timer);
    }
}
