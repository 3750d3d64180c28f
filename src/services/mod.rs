//! Command service module
//!
//! This module contains the transport-independent timer commands and the
//! response envelope every transport wraps.

pub mod envelope;
pub mod timer_commands;

// Re-export main types
pub use envelope::{Envelope, ErrorBody, TimerView};
pub use timer_commands::{
    validate_duration, validate_duration_seconds, CommandService, ControlTimerRequest,
    StartTimerRequest, TimerAction,
};
