//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure for the tool server
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-tools")]
#[command(about = "Countdown timer tool server with REST and MCP endpoints")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Number of history entries included in responses
    #[arg(long, default_value = "10")]
    pub history_limit: usize,

    /// Poll interval advertised to the frontend, in milliseconds
    #[arg(long, default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        log_level(self.verbose)
    }
}

/// CLI argument parsing structure for the terminal widget
#[derive(Parser, Debug, Clone)]
#[command(name = "timer-widget")]
#[command(about = "Terminal timer widget that mirrors a countdown-tools server")]
#[command(version)]
pub struct WidgetConfig {
    /// Base URL of the timer server
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Milliseconds between server syncs
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), default_value = "2000")]
    pub sync_interval_ms: u64,

    /// Milliseconds between local countdown ticks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), default_value = "1000")]
    pub tick_interval_ms: u64,

    /// Number of history entries kept for display
    #[arg(long, default_value = "10")]
    pub history_limit: usize,

    /// Upper bound on a single server request, in milliseconds
    #[arg(long, default_value = "2000")]
    pub request_timeout_ms: u64,

    /// Timers to create at launch, as NAME=SECONDS
    #[arg(long = "start", value_parser = parse_start_arg)]
    pub start: Vec<(String, u32)>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl WidgetConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn log_level(&self) -> &'static str {
        log_level(self.verbose)
    }
}

fn log_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Parse a `NAME=SECONDS` launch timer
fn parse_start_arg(arg: &str) -> Result<(String, u32), String> {
    let (name, seconds) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=SECONDS, got '{}'", arg))?;
    let seconds = seconds
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid seconds in '{}': {}", arg, e))?;
    Ok((name.trim().to_string(), seconds))
}
