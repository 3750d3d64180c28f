//! Main application state management

use std::{sync::Arc, time::Instant};

use crate::{
    error::Result,
    services::CommandService,
};

use super::{default_presets, lock_store, SharedStore};

/// Snapshot of store sizes for the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerCounts {
    pub active: usize,
    pub completed: usize,
}

/// Main application state shared by all transports and the tick task
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authoritative timer store
    pub store: SharedStore,
    /// Validation and envelope shaping in front of the store
    pub commands: CommandService,
    /// Server metadata
    pub start_time: Instant,
    /// Interval the frontend is told to poll at, in milliseconds
    pub poll_interval_ms: u64,
}

impl AppState {
    /// Create a new AppState around an empty store
    pub fn new(history_limit: usize, poll_interval_ms: u64) -> Self {
        let store = super::shared_store();
        let commands = CommandService::new(Arc::clone(&store), default_presets(), history_limit);

        Self {
            store,
            commands,
            start_time: Instant::now(),
            poll_interval_ms,
        }
    }

    /// Current number of active and finished timers
    pub fn timer_counts(&self) -> Result<TimerCounts> {
        let store = lock_store(&self.store)?;
        Ok(TimerCounts {
            active: store.active_count(),
            completed: store.history_count(),
        })
    }

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
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(10, 2000)
    }
}
