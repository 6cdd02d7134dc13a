//! Per-timer countdown driver task.

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::state::registry::{RegistryInner, TickOutcome};

/// Fixed countdown resolution. Remaining time decreases by one second per
/// tick invocation; a stalled runtime does not catch up missed ticks.
pub(crate) const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drive one timer's countdown until the registry tells it to retire.
///
/// Each tick goes through [`RegistryInner::apply_tick`], which re-checks
/// ownership under the registry lock: if the timer was paused, cancelled,
/// or replaced since this driver attached, the generation no longer
/// matches and the driver exits without touching state. The registry also
/// aborts the task on detach; the generation check covers a tick already
/// in flight at that moment.
pub(crate) async fn countdown_driver(registry: Arc<RegistryInner>, id: String, generation: u64) {
    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately at attach; the countdown
    // proper starts one period later.
    ticker.tick().await;
    debug!("Countdown driver attached for timer {id} (generation {generation})");

    loop {
        ticker.tick().await;
        match registry.apply_tick(&id, generation) {
            TickOutcome::Continue => {}
            TickOutcome::Retire => break,
        }
    }

    debug!("Countdown driver retired for timer {id} (generation {generation})");
}
