//! Text rendering of the widget state

use std::io::Write;

use tracing::warn;

use crate::state::format_clock;

use super::sync_state::WidgetState;

/// Draws the widget after a visible change
pub trait Renderer: Send {
    fn render(&mut self, state: &WidgetState);
}

/// Plain-text renderer, one line per timer
#[derive(Debug)]
pub struct TextRenderer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Render the state into lines of text
pub fn render_lines(state: &WidgetState) -> Vec<String> {
    let mut lines = Vec::new();
    let connection = if state.is_connected() { "server" } else { "offline" };
    lines.push(format!("== Timers [{}] ==", connection));

    if state.is_idle() {
        lines.push("  (no active timers)".to_string());
    }
    for timer in state.active() {
        lines.push(format!(
            "  {:<8} {:<20} {:>8}  {}",
            &timer.id[..timer.id.len().min(8)],
            timer.name,
            format_clock(timer.remaining_seconds),
            timer.status
        ));
    }

    if !state.history().is_empty() {
        lines.push("-- Recent --".to_string());
        for timer in state.history() {
            lines.push(format!("  {:<20} {}", timer.name, timer.status));
        }
    }
    lines
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, state: &WidgetState) {
        let text = render_lines(state).join("\n");
        if let Err(e) = writeln!(self.out, "{}\n", text).and_then(|_| self.out.flush()) {
            warn!("Failed to render widget: {}", e);
        }
    }
}
