//! Completion alert background task.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use crate::{services::run_alert_command, state::TimerEvent};

/// Background task that turns `Completed` events into user-facing alerts.
///
/// Runs the configured alert command once per completion, off the driver
/// path: a slow or failing alert never blocks a tick or rolls back the
/// completed state. Without a configured command, completions are only
/// logged.
pub async fn completion_alert_task(
    mut events: broadcast::Receiver<TimerEvent>,
    alert_command: Option<String>,
) {
    info!("Starting completion alert task");

    loop {
        match events.recv().await {
            Ok(TimerEvent::Completed { id, step_index, .. }) => match &alert_command {
                Some(command) => {
                    info!("Timer {id} completed (step {step_index}), running alert command");
                    if let Err(e) = run_alert_command(command, &id).await {
                        error!("Completion alert for timer {id} failed: {e}");
                    }
                }
                None => {
                    info!("Timer {id} completed (step {step_index}), no alert command configured");
                }
            },
            // Other transitions are for display observers, not alerts.
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion alert task lagged, skipped {skipped} events");
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping completion alert task");
                break;
            }
        }
    }
}
