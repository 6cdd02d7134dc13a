//! Timer transition events.
//!
//! Every registry state change produces one event on the broadcast
//! channel. The completion alert task consumes `Completed`; UI observers
//! may subscribe to the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timer;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started {
        id: String,
        step_index: u32,
        duration_seconds: u64,
        at: DateTime<Utc>,
    },
    Paused {
        id: String,
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    Resumed {
        id: String,
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    Cancelled {
        id: String,
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    /// Emitted exactly once per countdown reaching zero.
    Completed {
        id: String,
        step_index: u32,
        at: DateTime<Utc>,
    },
}

impl TimerEvent {
    pub fn started(timer: &Timer) -> Self {
        TimerEvent::Started {
            id: timer.id.clone(),
            step_index: timer.step_index,
            duration_seconds: timer.initial_seconds,
            at: Utc::now(),
        }
    }

    pub fn paused(timer: &Timer) -> Self {
        TimerEvent::Paused {
            id: timer.id.clone(),
            remaining_seconds: timer.remaining_seconds,
            at: Utc::now(),
        }
    }

    pub fn resumed(timer: &Timer) -> Self {
        TimerEvent::Resumed {
            id: timer.id.clone(),
            remaining_seconds: timer.remaining_seconds,
            at: Utc::now(),
        }
    }

    pub fn cancelled(timer: &Timer) -> Self {
        TimerEvent::Cancelled {
            id: timer.id.clone(),
            remaining_seconds: timer.remaining_seconds,
            at: Utc::now(),
        }
    }

    pub fn completed(timer: &Timer) -> Self {
        TimerEvent::Completed {
            id: timer.id.clone(),
            step_index: timer.step_index,
            at: Utc::now(),
        }
    }

    /// Id of the timer this event belongs to.
    pub fn timer_id(&self) -> &str {
        match self {
            TimerEvent::Started { id, .. }
            | TimerEvent::Paused { id, .. }
            | TimerEvent::Resumed { id, .. }
            | TimerEvent::Cancelled { id, .. }
            | TimerEvent::Completed { id, .. } => id,
        }
    }
}
