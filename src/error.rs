//! Error types for the timer core.

use thiserror::Error;

/// Errors surfaced by [`TimerRegistry`](crate::state::TimerRegistry) operations.
///
/// Control calls that find nothing to act on (pausing an absent timer,
/// cancelling an already-cancelled one) are *not* errors; they return
/// `Ok(None)`. Only caller misuse and internal lock failures land here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    /// Durations below one second are rejected rather than clamped.
    #[error("timer duration must be at least 1 second (got {0})")]
    InvalidDuration(u64),

    /// Timer ids must contain at least one non-whitespace character.
    #[error("timer id must not be empty")]
    EmptyId,

    /// The registry lock was poisoned by a panicking holder.
    #[error("timer registry lock poisoned")]
    Poisoned,
}
