//! Countdown Tools - countdown timers over REST, MCP and a syncing widget
//!
//! This library provides the timer store and its tick task, the command
//! service shared by every transport, the HTTP/MCP surface and the widget
//! client that mirrors server state.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod widget;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, WidgetConfig};
pub use error::{Result, TimerError};
pub use services::CommandService;
pub use state::{AppState, Timer, TimerStatus, TimerStore};
pub use utils::signals::shutdown_signal;
