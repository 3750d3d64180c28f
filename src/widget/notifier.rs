//! Completion signalling for finished timers

use std::io::Write;

use tracing::{info, warn};

use crate::state::Timer;

/// Receives one call per finished timer
pub trait CompletionNotifier: Send {
    fn notify(&mut self, timer: &Timer);
}

/// Rings the terminal bell and prints a line
#[derive(Debug)]
pub struct TerminalBell<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> CompletionNotifier for TerminalBell<W> {
    fn notify(&mut self, timer: &Timer) {
        info!("Timer '{}' ({}) finished", timer.name, timer.id);
        if let Err(e) = writeln!(self.out, "\x07*** '{}' is done! ***", timer.name)
            .and_then(|_| self.out.flush())
        {
            warn!("Failed to write completion notice: {}", e);
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub completed: Vec<String>,
}

#[cfg(test)]
impl CompletionNotifier for RecordingNotifier {
    fn notify(&mut self, timer: &Timer) {
        self.completed.push(timer.id.clone());
    }
}
