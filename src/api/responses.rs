//! API response structures

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{error::TimerError, services::Envelope};

impl IntoResponse for TimerError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            warn!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }

        (self.status_code(), Json(Envelope::failure(&self))).into_response()
    }
}

/// Turn a panic inside a handler into a generic 500 envelope
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    let err = TimerError::Internal("unexpected server error".to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::failure(&err))).into_response()
}

/// Status envelope plus the polling hints the frontend reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolledStatusResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(rename = "_pollingEnabled")]
    pub polling_enabled: bool,
    /// Milliseconds between polls
    #[serde(rename = "_pollingInterval")]
    pub polling_interval: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub active_timers: usize,
    pub completed_timers: usize,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String, active_timers: usize, completed_timers: usize) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
            active_timers,
            completed_timers,
        }
    }
}
