//! Timer tick background task

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    error::Result,
    state::{lock_store, SharedStore, Timer},
};

/// Logical length of one tick
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Advance every running timer by one second.
///
/// The whole pass runs under a single store lock, so control requests see
/// either the state before the pass or after it.
pub fn run_tick(store: &SharedStore) -> Result<Vec<Timer>> {
    let mut store = lock_store(store)?;
    let completed = store.tick_all();
    debug!(
        "Tick applied: {} active, {} completed this tick",
        store.active_count(),
        completed.len()
    );
    Ok(completed)
}

/// Background task that drives time for the lifetime of the process
pub async fn timer_tick_task(store: SharedStore) {
    info!("Starting timer tick task");

    // Late ticks are dropped instead of bursting, so ticks never pile up
    let mut interval = interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        interval.tick().await;

        match run_tick(&store) {
            Ok(completed) => {
                for timer in completed {
                    info!("Timer '{}' ({}) completed", timer.name, timer.id);
                }
            }
            Err(e) => {
                error!("Failed to advance timers: {}", e);
            }
        }
    }
}
