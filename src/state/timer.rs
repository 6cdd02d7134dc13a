//! Timer entity: one countdown instance tracked by id.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a stored timer.
///
/// There is no `Idle` variant: an idle timer is one the registry does not
/// hold at all, and queries for it return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    Completed,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
        }
    }
}

/// One countdown instance.
///
/// Ids are supplied by the caller, typically `"<recipe>-<step>"`, so that
/// re-entering a recipe step replaces the same timer slot. `step_index` is
/// carried for the caller's convenience and never drives registry logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: String,
    pub step_index: u32,
    /// Duration the countdown started from; restarting resets to a new value.
    pub initial_seconds: u64,
    /// Seconds left. Decreases only while running, frozen once completed.
    pub remaining_seconds: u64,
    pub status: TimerStatus,
}

impl Timer {
    /// Create a fresh running timer with a full countdown.
    pub fn new(id: &str, step_index: u32, duration_seconds: u64) -> Self {
        Self {
            id: id.to_string(),
            step_index,
            initial_seconds: duration_seconds,
            remaining_seconds: duration_seconds,
            status: TimerStatus::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused
    }

    pub fn is_completed(&self) -> bool {
        self.status == TimerStatus::Completed
    }
}
