//! Command service: validates requests and drives the timer store

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::{Result, TimerError},
    state::{lock_store, Preset, SharedStore, MAX_DURATION_SECONDS, MIN_DURATION_SECONDS},
};

use super::envelope::Envelope;

/// Body of a start request.
///
/// `duration_seconds` is kept as raw JSON so that a missing or mistyped
/// value surfaces as `InvalidDuration` rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<Value>,
}

/// Body of a control request addressed by id in the payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlTimerRequest {
    #[serde(default)]
    pub timer_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Control verbs accepted by `control_timer`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Pause,
    Resume,
    Stop,
}

impl TimerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerAction::Pause => "pause",
            TimerAction::Resume => "resume",
            TimerAction::Stop => "stop",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            TimerAction::Pause => "Timer paused",
            TimerAction::Resume => "Timer resumed",
            TimerAction::Stop => "Timer stopped",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            TimerAction::Pause => "Timer not found or not running",
            TimerAction::Resume => "Timer not found or not paused",
            TimerAction::Stop => "Timer not found or already finished",
        }
    }
}

impl FromStr for TimerAction {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pause" => Ok(TimerAction::Pause),
            "resume" => Ok(TimerAction::Resume),
            "stop" => Ok(TimerAction::Stop),
            other => Err(TimerError::InvalidAction(format!(
                "'{}' is not one of pause, resume, stop",
                other
            ))),
        }
    }
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a raw JSON duration is a whole number of seconds in range
pub fn validate_duration(value: Option<&Value>) -> Result<u32> {
    let number = match value {
        None | Some(Value::Null) => {
            return Err(TimerError::InvalidDuration(
                "durationSeconds is required".to_string(),
            ))
        }
        Some(Value::Number(number)) => number,
        Some(other) => {
            return Err(TimerError::InvalidDuration(format!(
                "durationSeconds must be a number, got {}",
                other
            )))
        }
    };

    let seconds = match (number.as_i64(), number.as_f64()) {
        (Some(whole), _) => whole,
        (None, Some(float)) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => float as i64,
        _ => {
            return Err(TimerError::InvalidDuration(format!(
                "durationSeconds must be a whole number, got {}",
                number
            )))
        }
    };

    validate_duration_seconds(seconds)
}

/// Check that a whole number of seconds is within the accepted range
pub fn validate_duration_seconds(seconds: i64) -> Result<u32> {
    if seconds < MIN_DURATION_SECONDS as i64 || seconds > MAX_DURATION_SECONDS as i64 {
        return Err(TimerError::InvalidDuration(format!(
            "durationSeconds must be between {} and {}, got {}",
            MIN_DURATION_SECONDS, MAX_DURATION_SECONDS, seconds
        )));
    }

    Ok(seconds as u32)
}

/// Stateless translation layer between transports and the store
#[derive(Debug, Clone)]
pub struct CommandService {
    store: SharedStore,
    presets: Arc<[Preset]>,
    history_limit: usize,
}

impl CommandService {
    pub fn new(store: SharedStore, presets: Vec<Preset>, history_limit: usize) -> Self {
        Self {
            store,
            presets: presets.into(),
            history_limit,
        }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Validate and start a new timer
    pub fn start_timer(&self, request: &StartTimerRequest) -> Result<Envelope> {
        let duration = validate_duration(request.duration_seconds.as_ref()).map_err(|e| {
            warn!("Rejected start request: {}", e);
            e
        })?;

        let mut store = lock_store(&self.store)?;
        let name = match request.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Timer {}", store.active_count() + 1),
        };

        let timer = store.create(name, duration);
        info!("Started timer '{}' ({}) for {}s", timer.name, timer.id, duration);

        let message = format!(
            "Timer '{}' started for {}m {}s",
            timer.name,
            timer.minutes_left(),
            timer.seconds_left()
        );
        let envelope = Envelope::new(
            true,
            message,
            &store.list_active(),
            &store.list_history(self.history_limit),
        );

        Ok(envelope.with_timer(&timer).with_presets(&self.presets))
    }

    /// Apply a control verb to a timer.
    ///
    /// An unknown id and a timer in the wrong state both produce a
    /// `success: false` envelope with the same message.
    pub fn control_timer(&self, request: &ControlTimerRequest) -> Result<Envelope> {
        let action: TimerAction = request
            .action
            .as_deref()
            .ok_or_else(|| TimerError::InvalidAction("action is required".to_string()))?
            .parse()?;

        let timer_id = request
            .timer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TimerError::InvalidRequest("timerId is required".to_string()))?;

        let mut store = lock_store(&self.store)?;
        let applied = match action {
            TimerAction::Pause => store.pause(timer_id),
            TimerAction::Resume => store.resume(timer_id),
            TimerAction::Stop => store.stop(timer_id),
        };

        let message = if applied {
            info!("Timer {} {}", timer_id, action);
            action.success_message()
        } else {
            warn!("Could not {} timer {}", action, timer_id);
            action.failure_message()
        };

        Ok(Envelope::new(
            applied,
            message,
            &store.list_active(),
            &store.list_history(self.history_limit),
        ))
    }

    /// Snapshot of active timers, the history tail and presets
    pub fn get_timer_status(&self) -> Result<Envelope> {
        let store = lock_store(&self.store)?;
        let message = format!("{} active timer(s)", store.active_count());
        let envelope = Envelope::new(
            true,
            message,
            &store.list_active(),
            &store.list_history(self.history_limit),
        );
        Ok(envelope.with_presets(&self.presets))
    }
}
