//! HTTP Controller
//!
//! Axum router for the query surface. Handlers only read the cache and
//! the scheduler state; they never wait on a refresh cycle and never
//! surface upstream provider failures. On total provider failure, stale
//! cache data keeps being served with an unchanged timestamp.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use crate::application::services::{ControlOutcome, RefreshScheduler};
use crate::domain::cache::MarketDataCache;
use crate::infrastructure::broadcast::BroadcastHub;

use super::response::{
    AllDataResponse, ControlResponse, HealthResponse, QuoteResponse, SourceStatusResponse,
    StatusResponse,
};
use super::ws;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared market data cache (read-only from handlers).
    pub cache: Arc<MarketDataCache>,
    /// Refresh scheduler, for status and start/stop controls.
    pub scheduler: Arc<RefreshScheduler>,
    /// Broadcast hub, for WebSocket listeners.
    pub hub: Arc<BroadcastHub>,
    /// Application version.
    pub version: String,
}

/// Create the HTTP router with all endpoints.
///
/// `/start` and `/stop` accept both GET and POST so that controls stay
/// reachable from a browser while remaining proper POST targets.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/quote/{symbols}", get(get_quotes))
        .route("/all", get(get_all))
        .route("/status", get(get_status))
        .route("/start", get(start_updates).post(start_updates))
        .route("/stop", get(stop_updates).post(stop_updates))
        .route("/ws", get(ws::market_updates_handler))
        .route("/health", get(health_check))
        .route("/healthz", get(liveness_check))
        .with_state(state)
}

/// Lookup of specific symbols; comma-separated in the path.
async fn get_quotes(
    State(state): State<AppState>,
    Path(symbols): Path<String>,
) -> impl IntoResponse {
    let mut data = HashMap::new();
    for symbol in symbols.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(record) = state.cache.get(symbol) {
            data.insert(symbol.to_string(), record);
        }
    }

    Json(QuoteResponse {
        success: true,
        data,
        timestamp: state.cache.last_update(),
        cached: true,
    })
}

/// Full cache dump.
async fn get_all(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.cache.snapshot();
    let count = data.len();

    Json(AllDataResponse {
        success: true,
        data,
        timestamp: state.cache.last_update(),
        count,
    })
}

/// Scheduler and cache status.
async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.scheduler.status();

    Json(StatusResponse {
        success: true,
        running: status.running,
        last_update: state.cache.last_update(),
        cached_symbols: state.cache.symbols(),
        update_interval: status.interval.as_secs(),
        sources: status
            .sources
            .into_iter()
            .map(|freshness| SourceStatusResponse {
                source: freshness.source,
                last_success: freshness.last_success,
            })
            .collect(),
    })
}

/// Start the refresh scheduler.
async fn start_updates(State(state): State<AppState>) -> impl IntoResponse {
    let message = match state.scheduler.start() {
        ControlOutcome::Changed => "market data updates started",
        ControlOutcome::Unchanged => "market data updates already running",
    };

    Json(ControlResponse {
        success: true,
        message: message.to_string(),
        running: state.scheduler.is_running(),
    })
}

/// Stop the refresh scheduler; the in-flight cycle completes first.
async fn stop_updates(State(state): State<AppState>) -> impl IntoResponse {
    let message = match state.scheduler.stop() {
        ControlOutcome::Changed => "market data updates stopped",
        ControlOutcome::Unchanged => "market data updates already stopped",
    };

    Json(ControlResponse {
        success: true,
        message: message.to_string(),
        running: state.scheduler.is_running(),
    })
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Liveness probe.
async fn liveness_check() -> impl IntoResponse {
    "OK"
}
