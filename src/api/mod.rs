//! HTTP API module
//!
//! This module contains the REST tool endpoints, the frontend aliases, the
//! MCP JSON-RPC endpoint and their response structures.

pub mod handlers;
pub mod mcp;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;
use mcp::mcp_handler;
use responses::panic_response;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Tool endpoints
        .route("/tools/startTimer", post(start_timer_handler))
        .route("/tools/controlTimer", post(control_timer_handler))
        .route("/tools/getTimerStatus", get(timer_status_handler))
        // Frontend aliases
        .route("/api/timers", get(list_timers_handler).post(start_timer_handler))
        .route("/api/timers/:id/control", post(control_timer_by_id_handler))
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}
