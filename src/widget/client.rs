//! Client side of the timer HTTP API used by the widget

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::{
    api::responses::PolledStatusResponse,
    services::{Envelope, TimerAction},
};

use super::sync_state::StatusSnapshot;

/// Failures talking to the timer server
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Transport failure, timeout or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a 5xx status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Server (or local validation) refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl WidgetError {
    /// True when the server could not serve the request at all, which is
    /// the case the widget falls back to local simulation for
    pub fn is_unreachable(&self) -> bool {
        !matches!(self, WidgetError::Rejected(_))
    }
}

/// Operations the widget needs from a timer server
#[async_trait]
pub trait TimerApi: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusSnapshot, WidgetError>;

    async fn start_timer(
        &self,
        name: Option<&str>,
        duration_seconds: u32,
    ) -> Result<Envelope, WidgetError>;

    async fn control_timer(
        &self,
        timer_id: &str,
        action: TimerAction,
    ) -> Result<Envelope, WidgetError>;
}

/// `TimerApi` over the frontend endpoints under `/api/timers`
#[derive(Debug, Clone)]
pub struct HttpTimerApi {
    client: Client,
    base_url: String,
}

impl HttpTimerApi {
    /// Create a client for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WidgetError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decode an envelope, classifying non-success statuses
async fn read_envelope(response: Response) -> Result<Envelope, WidgetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Envelope>().await?);
    }

    let message = match response.json::<Envelope>().await {
        Ok(envelope) => envelope.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    if status.is_client_error() {
        Err(WidgetError::Rejected(message))
    } else {
        Err(WidgetError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TimerApi for HttpTimerApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot, WidgetError> {
        let response = self.client.get(self.url("/api/timers")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown error").to_string(),
            });
        }

        let polled: PolledStatusResponse = response.json().await?;
        debug!(
            "Fetched {} active timers (server polls every {}ms)",
            polled.envelope.active_timers.len(),
            polled.polling_interval
        );
        Ok(StatusSnapshot::from(polled.envelope))
    }

    async fn start_timer(
        &self,
        name: Option<&str>,
        duration_seconds: u32,
    ) -> Result<Envelope, WidgetError> {
        let response = self
            .client
            .post(self.url("/api/timers"))
            .json(&json!({ "name": name, "durationSeconds": duration_seconds }))
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn control_timer(
        &self,
        timer_id: &str,
        action: TimerAction,
    ) -> Result<Envelope, WidgetError> {
        let response = self
            .client
            .post(self.url(&format!("/api/timers/{}/control", timer_id)))
            .json(&json!({ "action": action }))
            .send()
            .await?;
        read_envelope(response).await
    }
}
