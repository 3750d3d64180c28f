//! Uniform response envelope shared by every transport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorKind, TimerError},
    state::{Preset, Timer, TimerStatus},
};

/// Timer as exposed to clients, with the minutes/seconds breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub id: String,
    pub name: String,
    pub remaining_seconds: u32,
    pub minutes_left: u32,
    pub seconds_left: u32,
    pub status: TimerStatus,
    pub original_duration: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Timer> for TimerView {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id.clone(),
            name: timer.name.clone(),
            remaining_seconds: timer.remaining_seconds,
            minutes_left: timer.minutes_left(),
            seconds_left: timer.seconds_left(),
            status: timer.status,
            original_duration: timer.duration_seconds,
            created_at: timer.created_at,
            completed_at: timer.completed_at,
        }
    }
}

impl From<TimerView> for Timer {
    fn from(view: TimerView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            duration_seconds: view.original_duration,
            remaining_seconds: view.remaining_seconds,
            status: view.status,
            created_at: view.created_at,
            completed_at: view.completed_at,
        }
    }
}

/// Structured failure carried by error envelopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Response envelope returned by every command, on every transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerView>,
    #[serde(default)]
    pub active_timers: Vec<TimerView>,
    #[serde(default)]
    pub history: Vec<TimerView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<Vec<Preset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    /// Create an envelope around the active set and history tail
    pub fn new(success: bool, message: impl Into<String>, active: &[Timer], history: &[Timer]) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: Utc::now(),
            timer: None,
            active_timers: active.iter().map(TimerView::from).collect(),
            history: history.iter().map(TimerView::from).collect(),
            presets: None,
            error: None,
        }
    }

    /// Create an error envelope with no timer data
    pub fn failure(error: &TimerError) -> Self {
        let message = error.to_string();
        Self {
            success: false,
            message: message.clone(),
            timestamp: Utc::now(),
            timer: None,
            active_timers: Vec::new(),
            history: Vec::new(),
            presets: None,
            error: Some(ErrorBody {
                kind: error.kind(),
                message,
            }),
        }
    }

    pub fn with_timer(mut self, timer: &Timer) -> Self {
        self.timer = Some(TimerView::from(timer));
        self
    }

    pub fn with_presets(mut self, presets: &[Preset]) -> Self {
        self.presets = Some(presets.to_vec());
        self
    }
}
