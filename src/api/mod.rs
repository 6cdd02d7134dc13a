//! HTTP API module
//!
//! This module is the presentation surface over the timer registry: the
//! router, endpoint handlers, and response structures.

pub mod handlers;
pub mod responses;

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::TimerRegistry;
use handlers::*;

/// Shared state behind the HTTP surface: the timer registry plus server
/// metadata reported by `/status`.
pub struct ServerState {
    pub registry: TimerRegistry,
    pub start_time: Instant,
    pub host: String,
    pub port: u16,
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl ServerState {
    pub fn new(registry: TimerRegistry, host: String, port: u16) -> Self {
        Self {
            registry,
            start_time: Instant::now(),
            host,
            port,
            last_action: Mutex::new(None),
        }
    }

    /// Remember the most recent control action for `/status`.
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last) = self.last_action.lock() {
            *last = Some((action.to_string(), Utc::now()));
        }
    }

    pub fn last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock() {
            Ok(last) => match last.as_ref() {
                Some((action, at)) => (Some(action.clone()), Some(*at)),
                None => (None, None),
            },
            Err(_) => (None, None),
        }
    }

    /// Server uptime as a formatted string.
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{hours}h {minutes}m {seconds}s")
        } else if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/timers/:id/start", post(start_timer_handler))
        .route("/timers/:id/pause", post(pause_timer_handler))
        .route("/timers/:id/resume", post(resume_timer_handler))
        .route("/timers/:id/cancel", post(cancel_timer_handler))
        .route("/timers/:id", get(get_timer_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
