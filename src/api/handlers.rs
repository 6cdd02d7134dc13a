//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::error::TimerError;
use super::responses::{HealthResponse, StartTimerRequest, StatusResponse, TimerResponse};
use super::ServerState;

fn failure(err: TimerError) -> (StatusCode, Json<TimerResponse>) {
    let status = match err {
        TimerError::InvalidDuration(_) | TimerError::EmptyId => StatusCode::BAD_REQUEST,
        TimerError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(TimerResponse::error(err.to_string())))
}

/// Handle POST /timers/:id/start - Start or restart a countdown
pub async fn start_timer_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(request): Json<StartTimerRequest>,
) -> (StatusCode, Json<TimerResponse>) {
    state.record_action("start");

    match state
        .registry
        .start(&id, request.step_index, request.duration_seconds)
    {
        Ok(timer) => {
            info!(
                "Start endpoint called - timer {id} running for {}s",
                timer.initial_seconds
            );
            (
                StatusCode::OK,
                Json(TimerResponse::timer(
                    format!("timer started for {} seconds", timer.initial_seconds),
                    timer,
                )),
            )
        }
        Err(e) => {
            warn!("Start endpoint rejected for {id}: {e}");
            failure(e)
        }
    }
}

/// Handle POST /timers/:id/pause - Pause a running countdown
pub async fn pause_timer_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TimerResponse>) {
    state.record_action("pause");

    match state.registry.pause(&id) {
        Ok(Some(timer)) => {
            info!("Pause endpoint called - timer {id} paused");
            (
                StatusCode::OK,
                Json(TimerResponse::timer(
                    format!("timer paused with {} seconds left", timer.remaining_seconds),
                    timer,
                )),
            )
        }
        Ok(None) => (
            StatusCode::OK,
            Json(TimerResponse::noop(format!("no running timer {id} to pause"))),
        ),
        Err(e) => {
            error!("Pause endpoint failed for {id}: {e}");
            failure(e)
        }
    }
}

/// Handle POST /timers/:id/resume - Resume a paused countdown
pub async fn resume_timer_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TimerResponse>) {
    state.record_action("resume");

    match state.registry.resume(&id) {
        Ok(Some(timer)) => {
            info!("Resume endpoint called - timer {id} resumed");
            (
                StatusCode::OK,
                Json(TimerResponse::timer(
                    format!(
                        "timer resumed with {} seconds left",
                        timer.remaining_seconds
                    ),
                    timer,
                )),
            )
        }
        Ok(None) => (
            StatusCode::OK,
            Json(TimerResponse::noop(format!("no paused timer {id} to resume"))),
        ),
        Err(e) => {
            error!("Resume endpoint failed for {id}: {e}");
            failure(e)
        }
    }
}

/// Handle POST /timers/:id/cancel - Cancel a countdown
pub async fn cancel_timer_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TimerResponse>) {
    state.record_action("cancel");

    match state.registry.cancel(&id) {
        Ok(Some(_)) => {
            info!("Cancel endpoint called - timer {id} removed");
            (
                StatusCode::OK,
                Json(TimerResponse::new(
                    "idle".to_string(),
                    format!("timer {id} cancelled"),
                    None,
                )),
            )
        }
        Ok(None) => (
            StatusCode::OK,
            Json(TimerResponse::noop(format!("no timer {id} to cancel"))),
        ),
        Err(e) => {
            error!("Cancel endpoint failed for {id}: {e}");
            failure(e)
        }
    }
}

/// Handle GET /timers/:id - Query one timer's current state
pub async fn get_timer_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TimerResponse>) {
    match state.registry.get_timer(&id) {
        Ok(Some(timer)) => (
            StatusCode::OK,
            Json(TimerResponse::timer("timer state".to_string(), timer)),
        ),
        Ok(None) => (StatusCode::OK, Json(TimerResponse::idle(&id))),
        Err(e) => {
            error!("Timer query failed for {id}: {e}");
            failure(e)
        }
    }
}

/// Handle GET /status - Return all live timers and server metadata
pub async fn status_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timers = match state.registry.list_timers() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to list timers: {e}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.last_action();

    Ok(Json(StatusResponse {
        timers,
        uptime: state.uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
