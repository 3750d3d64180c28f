//! State management module
//!
//! This module contains the timer model, the timer store and the
//! application state shared by the HTTP handlers and background tasks.

pub mod app_state;
pub mod timer_state;
pub mod timer_store;

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use crate::error::{Result, TimerError};

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{
    default_presets, format_clock, Preset, TickOutcome, Timer, TimerStatus,
    MAX_DURATION_SECONDS, MIN_DURATION_SECONDS,
};
pub use timer_store::TimerStore;

/// Handle to the process-wide store.
///
/// Store operations never await while holding the lock, so a tick and a
/// control request on the same timer cannot interleave mid-mutation.
pub type SharedStore = Arc<Mutex<TimerStore>>;

/// Create an empty shared store
pub fn shared_store() -> SharedStore {
    Arc::new(Mutex::new(TimerStore::new()))
}

/// Lock the store, turning a poisoned lock into an internal error.
///
/// The lock detail is logged; callers only see a generic message.
pub fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, TimerStore>> {
    store.lock().map_err(|e| {
        error!("Failed to lock timer store: {}", e);
        TimerError::Internal(STORE_UNAVAILABLE.to_string())
    })
}

/// Message returned to clients when the store cannot be locked
pub const STORE_UNAVAILABLE: &str = "Timer store unavailable";
