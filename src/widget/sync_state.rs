//! Widget-side timer state and its reconciliation with the server
//!
//! The server is authoritative: every successful fetch overwrites local
//! copies that differ from it. Between fetches the widget interpolates by
//! counting running timers down locally with the same transition code the
//! server uses.
//!
//! Completion notifications are de-duplicated by timer id, so a timer that
//! both the local tick and a later sync see finishing is announced once.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    services::{Envelope, TimerAction},
    state::{Preset, TickOutcome, Timer, TimerStatus},
};

use super::notifier::CompletionNotifier;

/// Authoritative state as reported by one server response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub active: Vec<Timer>,
    /// Most recently finished first
    pub history: Vec<Timer>,
    /// `None` when the response did not carry presets
    pub presets: Option<Vec<Preset>>,
}

impl From<Envelope> for StatusSnapshot {
    fn from(envelope: Envelope) -> Self {
        Self {
            active: envelope.active_timers.into_iter().map(Timer::from).collect(),
            history: envelope.history.into_iter().map(Timer::from).collect(),
            presets: envelope.presets,
        }
    }
}

/// Local mirror of the server's timers
#[derive(Debug, Clone)]
pub struct WidgetState {
    active: Vec<Timer>,
    history: Vec<Timer>,
    presets: Vec<Preset>,
    /// History entries the server has not reported yet
    local_only: HashSet<String>,
    notified: HashSet<String>,
    connected: bool,
    history_limit: usize,
}

impl WidgetState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            active: Vec::new(),
            history: Vec::new(),
            presets: Vec::new(),
            local_only: HashSet::new(),
            notified: HashSet::new(),
            connected: false,
            history_limit,
        }
    }

    pub fn active(&self) -> &[Timer] {
        &self.active
    }

    pub fn history(&self) -> &[Timer] {
        &self.history
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// True while the local countdown loop has work to do
    pub fn has_running(&self) -> bool {
        self.active.iter().any(Timer::is_running)
    }

    pub fn get(&self, id: &str) -> Option<&Timer> {
        self.active.iter().find(|timer| timer.id == id)
    }

    /// Resolve a full id or a unique id prefix to an active timer's id
    pub fn resolve_id(&self, prefix: &str) -> Option<String> {
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self.active.iter().filter(|timer| timer.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(timer), None) => Some(timer.id.clone()),
            _ => None,
        }
    }

    /// Merge a server snapshot into local state. Returns true if anything
    /// visible changed.
    pub fn reconcile(
        &mut self,
        snapshot: StatusSnapshot,
        notifier: &mut dyn CompletionNotifier,
    ) -> bool {
        let mut changed = !self.connected;
        self.connected = true;

        // Timers the server no longer lists
        let server_ids: HashSet<&str> = snapshot.active.iter().map(|t| t.id.as_str()).collect();
        let (kept, gone): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|timer| server_ids.contains(timer.id.as_str()));
        self.active = kept;

        // A running timer that vanished finished on the server. Its own
        // history entry is used when the server sent one, so a remote stop
        // is not announced as a completion.
        let now = Utc::now();
        for timer in gone {
            changed = true;
            if !timer.is_running() {
                continue;
            }
            match snapshot.history.iter().find(|entry| entry.id == timer.id) {
                Some(entry) if entry.status == TimerStatus::Completed => {
                    debug!("Timer {} completed on the server", timer.id);
                    self.notify_once(entry, notifier);
                }
                Some(entry) => debug!("Timer {} was {} on the server", timer.id, entry.status),
                None => {
                    debug!("Timer {} finished on the server", timer.id);
                    let finished = timer.completed_snapshot(now);
                    self.notify_once(&finished, notifier);
                    self.record_local_history(finished);
                }
            }
        }

        // Server copies win on any difference
        if self.active != snapshot.active {
            changed = true;
            self.active = snapshot.active;
        }

        if let Some(presets) = snapshot.presets {
            if self.presets != presets {
                changed = true;
                self.presets = presets;
            }
        }

        let history = self.merge_history(snapshot.history);
        if self.history != history {
            changed = true;
            self.history = history;
        }

        self.prune_notified();
        changed
    }

    /// Record that the server could not be reached. Returns true if this
    /// changes the connection state.
    pub fn mark_disconnected(&mut self) -> bool {
        let changed = self.connected;
        self.connected = false;
        changed
    }

    /// One local countdown step. Returns true if any timer was running.
    pub fn local_tick(&mut self, notifier: &mut dyn CompletionNotifier) -> bool {
        if !self.has_running() {
            return false;
        }

        let now = Utc::now();
        let mut finished = Vec::new();
        for timer in self.active.iter_mut() {
            if timer.tick(now) == TickOutcome::Completed {
                finished.push(timer.id.clone());
            }
        }

        for id in finished {
            if let Some(index) = self.active.iter().position(|timer| timer.id == id) {
                let timer = self.active.remove(index);
                info!("Timer '{}' finished locally", timer.name);
                self.notify_once(&timer, notifier);
                self.record_local_history(timer);
            }
        }
        true
    }

    /// Create a timer without the server
    pub fn create_local(&mut self, name: Option<&str>, duration_seconds: u32) -> Timer {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Timer {}", self.active.len() + 1),
        };
        let timer = Timer::new(name, duration_seconds);
        info!("Created local timer '{}' ({})", timer.name, timer.id);
        self.active.push(timer.clone());
        timer
    }

    /// Apply a control verb without the server
    pub fn control_local(&mut self, id: &str, action: TimerAction) -> bool {
        let Some(index) = self.active.iter().position(|timer| timer.id == id) else {
            return false;
        };

        match action {
            TimerAction::Pause => self.active[index].pause(),
            TimerAction::Resume => self.active[index].resume(),
            TimerAction::Stop => {
                if !self.active[index].stop(Utc::now()) {
                    return false;
                }
                let timer = self.active.remove(index);
                self.record_local_history(timer);
                true
            }
        }
    }

    fn notify_once(&mut self, timer: &Timer, notifier: &mut dyn CompletionNotifier) {
        if self.notified.insert(timer.id.clone()) {
            notifier.notify(timer);
        } else {
            debug!("Suppressed repeat completion notice for {}", timer.id);
        }
    }

    fn record_local_history(&mut self, timer: Timer) {
        if self.history.iter().any(|entry| entry.id == timer.id) {
            return;
        }
        self.local_only.insert(timer.id.clone());
        self.history.insert(0, timer);
        self.history.truncate(self.history_limit);
    }

    /// Server history, preceded by local-only entries the server has not
    /// reported yet. Entries for timers the server still lists as active
    /// are dropped.
    fn merge_history(&mut self, server_history: Vec<Timer>) -> Vec<Timer> {
        let active_ids: HashSet<&str> = self.active.iter().map(|t| t.id.as_str()).collect();
        let server_ids: HashSet<&str> = server_history.iter().map(|t| t.id.as_str()).collect();

        self.local_only
            .retain(|id| !server_ids.contains(id.as_str()) && !active_ids.contains(id.as_str()));

        let mut merged: Vec<Timer> = self
            .history
            .iter()
            .filter(|entry| self.local_only.contains(&entry.id))
            .cloned()
            .collect();
        merged.extend(server_history);
        merged.truncate(self.history_limit);
        merged
    }

    fn prune_notified(&mut self) {
        let active = &self.active;
        let history = &self.history;
        self.notified.retain(|id| {
            active.iter().any(|t| &t.id == id) || history.iter().any(|t| &t.id == id)
        });
    }
}
