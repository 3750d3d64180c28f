//! Error types for the timer command surface

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, TimerError>;

/// Failures a command can end in before or while touching the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Missing, non-integer or out-of-range duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Control verb other than pause, resume or stop
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Body could not be decoded or a required field is missing
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error kind carried in error envelopes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDuration,
    InvalidAction,
    InvalidRequest,
    InternalError,
}

impl TimerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimerError::InvalidDuration(_) => ErrorKind::InvalidDuration,
            TimerError::InvalidAction(_) => ErrorKind::InvalidAction,
            TimerError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            TimerError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// HTTP status the transports answer with for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TimerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// True for failures caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TimerError::Internal(_))
    }
}
