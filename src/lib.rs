//! Simmer - concurrent step timers for a recipe cooking assistant
//!
//! This library owns the countdown timers behind a cooking assistant's
//! recipe steps: several independent per-step timers run concurrently,
//! each with its own start/pause/resume/cancel control, and a completion
//! alert fires exactly once when a countdown reaches zero.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::{create_router, ServerState};
pub use config::Config;
pub use error::TimerError;
pub use state::{Timer, TimerEvent, TimerRegistry, TimerStatus};
pub use utils::signals::shutdown_signal;
