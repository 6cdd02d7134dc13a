//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::Timer;

/// Body of `POST /timers/:id/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub step_index: u32,
    pub duration_seconds: u64,
}

/// Response envelope for timer control and query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<Timer>,
}

impl TimerResponse {
    pub fn new(status: String, message: String, timer: Option<Timer>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Response carrying a timer snapshot; status mirrors the timer's.
    pub fn timer(message: String, timer: Timer) -> Self {
        Self::new(timer.status.as_str().to_string(), message, Some(timer))
    }

    /// Response for an id with no live timer.
    pub fn idle(id: &str) -> Self {
        Self::new("idle".to_string(), format!("no timer for {id}"), None)
    }

    /// Response for a control call that found nothing to do.
    pub fn noop(message: String) -> Self {
        Self::new("noop".to_string(), message, None)
    }

    /// Error response.
    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message, None)
    }
}

/// Aggregate status response with all live timers and server metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<Timer>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
