//! Timer state module
//!
//! This module contains the timer entity, transition events, and the
//! registry that owns and drives all live timers.

pub mod events;
pub mod registry;
pub mod timer;

// Re-export main types
pub use events::TimerEvent;
pub use registry::TimerRegistry;
pub use timer::{Timer, TimerStatus};
