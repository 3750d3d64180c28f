//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    error::{Result, TimerError},
    services::{ControlTimerRequest, Envelope, StartTimerRequest},
    state::AppState,
};
use super::responses::{HealthResponse, PolledStatusResponse};

/// Body of `POST /api/timers/:id/control`
#[derive(Debug, Deserialize)]
pub struct ControlActionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

/// Unwrap a JSON body, reporting decode failures as an error envelope
fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| TimerError::InvalidRequest(rejection.body_text()))
}

/// Handle POST /tools/startTimer and POST /api/timers
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<StartTimerRequest>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let request = json_body(body)?;
    state.commands.start_timer(&request).map(Json)
}

/// Handle POST /tools/controlTimer
pub async fn control_timer_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ControlTimerRequest>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let request = json_body(body)?;
    state.commands.control_timer(&request).map(Json)
}

/// Handle POST /api/timers/:id/control
pub async fn control_timer_by_id_handler(
    State(state): State<Arc<AppState>>,
    Path(timer_id): Path<String>,
    body: std::result::Result<Json<ControlActionRequest>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let ControlActionRequest { action } = json_body(body)?;
    let request = ControlTimerRequest {
        timer_id: Some(timer_id),
        action,
    };
    state.commands.control_timer(&request).map(Json)
}

/// Handle GET /tools/getTimerStatus
pub async fn timer_status_handler(State(state): State<Arc<AppState>>) -> Result<Json<Envelope>> {
    state.commands.get_timer_status().map(Json)
}

/// Handle GET /api/timers - status plus polling hints for the frontend
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PolledStatusResponse>> {
    let envelope = state.commands.get_timer_status()?;
    debug!("Serving {} active timers to poller", envelope.active_timers.len());

    Ok(Json(PolledStatusResponse {
        envelope,
        polling_enabled: true,
        polling_interval: state.poll_interval_ms,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>> {
    let counts = state.timer_counts().map_err(|e| {
        error!("Failed to read timer counts: {}", e);
        e
    })?;

    Ok(Json(HealthResponse::ok(
        state.get_uptime(),
        counts.active,
        counts.completed,
    )))
}
