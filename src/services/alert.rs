//! User-facing completion alerts via an external command.

use tokio::process::Command;
use tracing::{debug, info};

/// Run the configured alert command for a completed timer.
///
/// The command is executed through `sh -c` with every `{id}` placeholder
/// replaced by the timer id, e.g.
/// `notify-send "Step done" "{id}"`.
pub async fn run_alert_command(command: &str, timer_id: &str) -> Result<(), String> {
    let rendered = command.replace("{id}", timer_id);
    debug!("Running alert command: {rendered}");

    let output = Command::new("sh")
        .args(["-c", &rendered])
        .output()
        .await
        .map_err(|e| format!("Failed to spawn alert command: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Alert command exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    info!("Completion alert delivered for timer {timer_id}");
    Ok(())
}
