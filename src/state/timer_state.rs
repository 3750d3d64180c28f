//! Timer structure and its lifecycle transitions
//!
//! The transitions here are shared by the authoritative store and the
//! widget's offline simulation, so both sides count down identically.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest duration a timer may be started with
pub const MIN_DURATION_SECONDS: u32 = 1;
/// Longest duration a timer may be started with (two hours)
pub const MAX_DURATION_SECONDS: u32 = 7200;

/// Lifecycle status of a timer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    Stopped,
    Completed,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Stopped => "stopped",
            TimerStatus::Completed => "completed",
        }
    }

    /// Running and paused timers belong to the active set
    pub fn is_active(&self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying one second to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running (or already at zero); nothing changed
    Idle,
    /// One second was counted off
    Counted,
    /// The countdown reached zero and the timer is now completed
    Completed,
}

/// A countdown unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub name: String,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub status: TimerStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Timer {
    /// Create a running timer with a fresh id
    pub fn new(name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_seconds,
            remaining_seconds: duration_seconds,
            status: TimerStatus::Running,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn minutes_left(&self) -> u32 {
        self.remaining_seconds / 60
    }

    pub fn seconds_left(&self) -> u32 {
        self.remaining_seconds % 60
    }

    /// Running -> paused. Returns false if the timer was not running.
    pub fn pause(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    /// Paused -> running. Returns false if the timer was not paused.
    pub fn resume(&mut self) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    /// Running or paused -> stopped, stamping `completed_at`
    pub fn stop(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = TimerStatus::Stopped;
        self.completed_at = Some(at);
        true
    }

    /// Count off one second; completes the timer when it reaches zero
    pub fn tick(&mut self, at: DateTime<Utc>) -> TickOutcome {
        if self.status != TimerStatus::Running || self.remaining_seconds == 0 {
            return TickOutcome::Idle;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.status = TimerStatus::Completed;
            self.completed_at = Some(at);
            TickOutcome::Completed
        } else {
            TickOutcome::Counted
        }
    }

    /// Snapshot of this timer as it would be recorded after finishing
    /// elsewhere (used when a peer reports the timer gone)
    pub fn completed_snapshot(&self, at: DateTime<Utc>) -> Self {
        Self {
            remaining_seconds: 0,
            status: TimerStatus::Completed,
            completed_at: Some(at),
            ..self.clone()
        }
    }
}

/// Named duration template offered to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub duration_seconds: u32,
    pub label: String,
}

const PRESETS: &[(&str, u32, &str)] = &[
    ("Pomodoro", 25 * 60, "25 min"),
    ("Short Break", 5 * 60, "5 min"),
    ("Long Break", 15 * 60, "15 min"),
    ("Coffee Break", 5 * 60, "5 min"),
    ("Tea", 3 * 60, "3 min"),
    ("Quick Focus", 10 * 60, "10 min"),
];

/// The process-wide preset list
pub fn default_presets() -> Vec<Preset> {
    PRESETS
        .iter()
        .map(|(name, duration_seconds, label)| Preset {
            name: name.to_string(),
            duration_seconds: *duration_seconds,
            label: label.to_string(),
        })
        .collect()
}

/// Format seconds as `MM:SS`, or `H:MM:SS` past the hour
pub fn format_clock(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
