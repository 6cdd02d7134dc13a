//! Background tasks module
//!
//! This module contains the per-timer countdown drivers and the
//! completion alert task that runs alongside the HTTP server.

pub mod completion_alert;
pub(crate) mod countdown;

// Re-export main functions
pub use completion_alert::completion_alert_task;
