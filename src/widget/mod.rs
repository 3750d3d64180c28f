//! Timer widget module
//!
//! A client that mirrors a timer server: it polls the server's status,
//! reconciles against its own optimistic local state, counts down locally
//! between polls and falls back to purely local simulation when the server
//! cannot be reached.

pub mod client;
pub mod notifier;
pub mod render;
pub mod runner;
pub mod sync_state;

// Re-export main types
pub use client::{HttpTimerApi, TimerApi, WidgetError};
pub use notifier::{CompletionNotifier, TerminalBell};
pub use render::{render_lines, Renderer, TextRenderer};
pub use runner::{Widget, WidgetCommand, WidgetTiming};
pub use sync_state::{StatusSnapshot, WidgetState};
