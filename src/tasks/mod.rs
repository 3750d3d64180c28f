//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod timer_ticker;

// Re-export main functions
pub use timer_ticker::{run_tick, timer_tick_task, TICK_INTERVAL};
