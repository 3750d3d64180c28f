//! Timer Widget - terminal mirror of a countdown-tools server
//!
//! Polls the server, counts down locally between polls and keeps working
//! offline when the server is unreachable.

use std::io;

use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};

use countdown_tools::{
    config::WidgetConfig,
    utils::shutdown_signal,
    widget::{HttpTimerApi, TerminalBell, TextRenderer, Widget, WidgetCommand, WidgetTiming},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WidgetConfig::parse();

    // Logs go to stderr so they do not interleave with the rendered widget
    let level = config.log_level();
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_tools={},timer_widget={}", level, level))
        .with_writer(io::stderr)
        .init();

    info!("Starting timer widget against {}", config.server);

    let api = HttpTimerApi::new(config.server.clone(), config.request_timeout())?;
    let mut widget = Widget::new(
        api,
        TerminalBell::new(io::stdout()),
        TextRenderer::new(io::stdout()),
        config.history_limit,
    );

    for (name, seconds) in &config.start {
        if let Err(e) = widget.start_timer(Some(name.as_str()), *seconds).await {
            warn!("Could not start '{}': {}", name, e);
        }
    }

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match WidgetCommand::parse(&line) {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break;
                }
            }
        }
    });

    let timing = WidgetTiming {
        sync_interval: config.sync_interval(),
        tick_interval: config.tick_interval(),
    };
    widget.run(timing, rx, shutdown_signal()).await;

    info!("Widget stopped");
    Ok(())
}
