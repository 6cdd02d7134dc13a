//! Timer registry: the single authoritative owner of all live timers.
//!
//! The registry serializes every mutation behind one mutex. Each running
//! timer is driven by a spawned countdown task; attaching a driver tags it
//! with a generation number drawn from a monotone counter, and every
//! detachment (pause, cancel, replacement, completion) bumps the record's
//! generation so an in-flight tick from a stale driver observes the
//! mismatch and retires without mutating state it no longer owns.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::error::TimerError;
use crate::tasks::countdown::countdown_driver;

use super::{Timer, TimerEvent, TimerStatus};

/// One registry slot: the timer record plus its driver bookkeeping.
struct TimerRecord {
    timer: Timer,
    /// Generation of the driver currently allowed to tick this record.
    generation: u64,
    driver: Option<JoinHandle<()>>,
}

impl TimerRecord {
    /// Abort the attached driver task, if any.
    fn stop_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}

/// What a driver should do after delivering a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Retire,
}

/// Shared core of the registry, handed to driver tasks.
pub(crate) struct RegistryInner {
    timers: Mutex<HashMap<String, TimerRecord>>,
    next_generation: AtomicU64,
    event_tx: broadcast::Sender<TimerEvent>,
    snapshot_tx: watch::Sender<Vec<Timer>>,
    /// Keep one receiver alive so snapshot sends never fail.
    _snapshot_rx: watch::Receiver<Vec<Timer>>,
}

impl RegistryInner {
    fn lock_timers(&self) -> Result<MutexGuard<'_, HashMap<String, TimerRecord>>, TimerError> {
        self.timers.lock().map_err(|_| TimerError::Poisoned)
    }

    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Publish the current snapshot to watch subscribers. Called with the
    /// lock held so snapshots are ordered like the mutations themselves.
    fn publish_snapshot(&self, timers: &HashMap<String, TimerRecord>) {
        let mut snapshot: Vec<Timer> = timers.values().map(|r| r.timer.clone()).collect();
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));
        if self.snapshot_tx.send(snapshot).is_err() {
            debug!("No snapshot watchers; dropping timer snapshot");
        }
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event subscribers; dropping timer event");
        }
    }

    /// Deliver one tick on behalf of the driver tagged `generation`.
    ///
    /// The record must still exist, still carry this generation, and still
    /// be running; otherwise the tick is stale and the driver retires.
    /// Reaching zero performs the completion transition atomically under
    /// the lock, so it can happen at most once per attachment.
    pub(crate) fn apply_tick(&self, id: &str, generation: u64) -> TickOutcome {
        let Ok(mut timers) = self.timers.lock() else {
            error!("Timer registry lock poisoned; retiring driver for {id}");
            return TickOutcome::Retire;
        };
        let Some(record) = timers.get_mut(id) else {
            return TickOutcome::Retire;
        };
        if record.generation != generation || record.timer.status != TimerStatus::Running {
            return TickOutcome::Retire;
        }

        record.timer.remaining_seconds = record.timer.remaining_seconds.saturating_sub(1);
        if record.timer.remaining_seconds == 0 {
            record.timer.status = TimerStatus::Completed;
            // Nothing owns this record until a restart re-attaches.
            record.generation = self.next_generation();
            record.driver = None;
            let completed = record.timer.clone();
            self.publish_snapshot(&timers);
            drop(timers);
            info!("Timer {} completed (step {})", completed.id, completed.step_index);
            self.emit(TimerEvent::completed(&completed));
            return TickOutcome::Retire;
        }

        let remaining = record.timer.remaining_seconds;
        self.publish_snapshot(&timers);
        drop(timers);
        debug!("Timer {id} ticked, {remaining}s remaining");
        TickOutcome::Continue
    }
}

/// Handle to the timer registry. Cheap to clone; all clones share state.
///
/// Must be used inside a tokio runtime: `start` and `resume` spawn the
/// countdown driver tasks.
#[derive(Clone)]
pub struct TimerRegistry {
    inner: Arc<RegistryInner>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(RegistryInner {
                timers: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                event_tx,
                snapshot_tx,
                _snapshot_rx: snapshot_rx,
            }),
        }
    }

    /// Start (or restart) the countdown for `id`.
    ///
    /// Zero durations are rejected, not clamped. An existing timer for the
    /// same id, whatever its status, is cancelled and replaced in the same
    /// critical section, so no window exists where two drivers own the id.
    pub fn start(
        &self,
        id: &str,
        step_index: u32,
        duration_seconds: u64,
    ) -> Result<Timer, TimerError> {
        if id.trim().is_empty() {
            return Err(TimerError::EmptyId);
        }
        if duration_seconds == 0 {
            return Err(TimerError::InvalidDuration(duration_seconds));
        }

        let mut timers = self.inner.lock_timers()?;
        if let Some(mut previous) = timers.remove(id) {
            previous.stop_driver();
            debug!(
                "Replacing existing timer {id} ({})",
                previous.timer.status.as_str()
            );
        }

        let timer = Timer::new(id, step_index, duration_seconds);
        let generation = self.inner.next_generation();
        let driver = tokio::spawn(countdown_driver(
            Arc::clone(&self.inner),
            id.to_string(),
            generation,
        ));
        timers.insert(
            id.to_string(),
            TimerRecord {
                timer: timer.clone(),
                generation,
                driver: Some(driver),
            },
        );
        self.inner.publish_snapshot(&timers);
        drop(timers);

        info!("Timer {id} started: step {step_index}, {duration_seconds}s");
        self.inner.emit(TimerEvent::started(&timer));
        Ok(timer)
    }

    /// Pause a running countdown, keeping its remaining time.
    ///
    /// Returns `Ok(None)` if there is no running timer for `id`. After this
    /// returns, no further tick for the old driver can mutate the record.
    pub fn pause(&self, id: &str) -> Result<Option<Timer>, TimerError> {
        let mut timers = self.inner.lock_timers()?;
        let Some(record) = timers.get_mut(id) else {
            return Ok(None);
        };
        if record.timer.status != TimerStatus::Running {
            return Ok(None);
        }

        record.stop_driver();
        record.generation = self.inner.next_generation();
        record.timer.status = TimerStatus::Paused;
        let timer = record.timer.clone();
        self.inner.publish_snapshot(&timers);
        drop(timers);

        info!("Timer {id} paused with {}s remaining", timer.remaining_seconds);
        self.inner.emit(TimerEvent::paused(&timer));
        Ok(Some(timer))
    }

    /// Resume a paused countdown from its remaining time.
    ///
    /// Returns `Ok(None)` if there is no paused timer for `id`.
    pub fn resume(&self, id: &str) -> Result<Option<Timer>, TimerError> {
        let mut timers = self.inner.lock_timers()?;
        let Some(record) = timers.get_mut(id) else {
            return Ok(None);
        };
        if record.timer.status != TimerStatus::Paused {
            return Ok(None);
        }

        record.timer.status = TimerStatus::Running;
        let generation = self.inner.next_generation();
        record.generation = generation;
        record.driver = Some(tokio::spawn(countdown_driver(
            Arc::clone(&self.inner),
            id.to_string(),
            generation,
        )));
        let timer = record.timer.clone();
        self.inner.publish_snapshot(&timers);
        drop(timers);

        info!("Timer {id} resumed with {}s remaining", timer.remaining_seconds);
        self.inner.emit(TimerEvent::resumed(&timer));
        Ok(Some(timer))
    }

    /// Cancel a timer, removing it entirely from the registry.
    ///
    /// Returns `Ok(None)` if no timer exists for `id`. Subsequent queries
    /// report absence, and no further tick for it will be observed.
    pub fn cancel(&self, id: &str) -> Result<Option<Timer>, TimerError> {
        let mut timers = self.inner.lock_timers()?;
        let Some(mut record) = timers.remove(id) else {
            return Ok(None);
        };
        record.stop_driver();
        let timer = record.timer;
        self.inner.publish_snapshot(&timers);
        drop(timers);

        info!("Timer {id} cancelled");
        self.inner.emit(TimerEvent::cancelled(&timer));
        Ok(Some(timer))
    }

    /// Snapshot of a single timer, reflecting the most recent tick.
    pub fn get_timer(&self, id: &str) -> Result<Option<Timer>, TimerError> {
        let timers = self.inner.lock_timers()?;
        Ok(timers.get(id).map(|record| record.timer.clone()))
    }

    /// Snapshot of all live timers, sorted by id.
    pub fn list_timers(&self) -> Result<Vec<Timer>, TimerError> {
        let timers = self.inner.lock_timers()?;
        let mut all: Vec<Timer> = timers.values().map(|r| r.timer.clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    /// Stop every live driver and drop all records.
    pub fn shutdown(&self) -> Result<(), TimerError> {
        let mut timers = self.inner.lock_timers()?;
        let count = timers.len();
        for record in timers.values_mut() {
            record.stop_driver();
        }
        timers.clear();
        self.inner.publish_snapshot(&timers);
        drop(timers);

        info!("Timer registry shut down, {count} timers stopped");
        Ok(())
    }

    /// Subscribe to timer transition events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Watch the continuously updated timer snapshot.
    pub fn watch_timers(&self) -> watch::Receiver<Vec<Timer>> {
        self.inner.snapshot_tx.subscribe()
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tokio::{task, time};

    use crate::tasks::countdown::TICK_PERIOD;

    use super::*;

    // All tests run with start_paused so the clock only moves through
    // time::advance and tick counts are exact.

    /// Let spawned drivers run until they are parked on their next tick.
    async fn settle() {
        for _ in 0..10 {
            task::yield_now().await;
        }
    }

    async fn advance_ticks(n: u64) {
        for _ in 0..n {
            time::advance(TICK_PERIOD).await;
            settle().await;
        }
    }

    fn drain(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn completions(events: &[TimerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Completed { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_zero_duration() {
        let registry = TimerRegistry::new();
        assert_eq!(
            registry.start("r1-0", 0, 0),
            Err(TimerError::InvalidDuration(0))
        );
        assert_eq!(registry.get_timer("r1-0"), Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_empty_id() {
        let registry = TimerRegistry::new();
        assert_eq!(registry.start("", 0, 10), Err(TimerError::EmptyId));
        assert_eq!(registry.start("   ", 0, 10), Err(TimerError::EmptyId));
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_completion() {
        let registry = TimerRegistry::new();
        let mut events = registry.subscribe_events();

        registry.start("r1-0", 0, 3).unwrap();
        settle().await;

        advance_ticks(1).await;
        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.remaining_seconds, 2);
        assert_eq!(timer.status, TimerStatus::Running);

        advance_ticks(2).await;
        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.remaining_seconds, 0);
        assert_eq!(timer.status, TimerStatus::Completed);

        assert_eq!(completions(&drain(&mut events)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_fires_exactly_once() {
        let registry = TimerRegistry::new();
        let mut events = registry.subscribe_events();

        registry.start("r1-0", 0, 2).unwrap();
        settle().await;

        // Keep ticking well past completion.
        advance_ticks(6).await;

        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.status, TimerStatus::Completed);
        assert_eq!(timer.remaining_seconds, 0);
        assert_eq!(completions(&drain(&mut events)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_resume_round_trip() {
        let registry = TimerRegistry::new();

        registry.start("r1-0", 0, 10).unwrap();
        settle().await;
        advance_ticks(3).await;
        assert_eq!(
            registry.get_timer("r1-0").unwrap().unwrap().remaining_seconds,
            7
        );

        let paused = registry.pause("r1-0").unwrap().unwrap();
        assert_eq!(paused.status, TimerStatus::Paused);
        assert_eq!(paused.remaining_seconds, 7);

        // Five would-be ticks pass while paused; remaining must not move.
        advance_ticks(5).await;
        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.status, TimerStatus::Paused);
        assert_eq!(timer.remaining_seconds, 7);

        registry.resume("r1-0").unwrap().unwrap();
        settle().await;
        advance_ticks(7).await;
        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.status, TimerStatus::Completed);
        assert_eq!(timer.remaining_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn control_calls_are_noops_in_wrong_status() {
        let registry = TimerRegistry::new();

        assert_eq!(registry.pause("missing"), Ok(None));
        assert_eq!(registry.resume("missing"), Ok(None));
        assert_eq!(registry.cancel("missing"), Ok(None));

        registry.start("r1-0", 0, 5).unwrap();
        settle().await;
        assert_eq!(registry.resume("r1-0"), Ok(None)); // already running

        registry.pause("r1-0").unwrap().unwrap();
        assert_eq!(registry.pause("r1-0"), Ok(None)); // already paused
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_removes_timer_and_silences_driver() {
        let registry = TimerRegistry::new();
        let mut events = registry.subscribe_events();

        registry.start("r1-0", 0, 5).unwrap();
        settle().await;
        advance_ticks(1).await;

        let cancelled = registry.cancel("r1-0").unwrap().unwrap();
        assert_eq!(cancelled.remaining_seconds, 4);
        assert_eq!(registry.get_timer("r1-0"), Ok(None));

        // Any in-flight tick must be discarded; nothing reappears.
        advance_ticks(10).await;
        assert_eq!(registry.get_timer("r1-0"), Ok(None));
        assert_eq!(completions(&drain(&mut events)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_completed_timer() {
        let registry = TimerRegistry::new();
        let mut events = registry.subscribe_events();

        registry.start("r1-0", 0, 2).unwrap();
        settle().await;
        advance_ticks(2).await;
        assert!(registry.get_timer("r1-0").unwrap().unwrap().is_completed());
        assert_eq!(completions(&drain(&mut events)), 1);

        let restarted = registry.start("r1-0", 0, 4).unwrap();
        assert_eq!(restarted.status, TimerStatus::Running);
        assert_eq!(restarted.initial_seconds, 4);
        assert_eq!(restarted.remaining_seconds, 4);
        settle().await;

        // No stray completion from the previous lifecycle.
        advance_ticks(1).await;
        let timer = registry.get_timer("r1-0").unwrap().unwrap();
        assert_eq!(timer.remaining_seconds, 3);
        assert_eq!(completions(&drain(&mut events)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_restart_leaves_single_driver() {
        let registry = TimerRegistry::new();

        registry.start("r1-0", 0, 10).unwrap();
        registry.cancel("r1-0").unwrap();
        registry.start("r1-0", 0, 10).unwrap();
        registry.start("r1-0", 0, 10).unwrap();
        settle().await;

        // With a dangling driver the decrement would double up.
        advance_ticks(1).await;
        assert_eq!(
            registry.get_timer("r1-0").unwrap().unwrap().remaining_seconds,
            9
        );
        advance_ticks(1).await;
        assert_eq!(
            registry.get_timer("r1-0").unwrap().unwrap().remaining_seconds,
            8
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timers_tick_independently() {
        let registry = TimerRegistry::new();

        registry.start("stew-1", 1, 5).unwrap();
        registry.start("bread-2", 2, 8).unwrap();
        settle().await;

        advance_ticks(2).await;
        registry.pause("stew-1").unwrap().unwrap();

        advance_ticks(3).await;
        let stew = registry.get_timer("stew-1").unwrap().unwrap();
        assert_eq!(stew.status, TimerStatus::Paused);
        assert_eq!(stew.remaining_seconds, 3);
        let bread = registry.get_timer("bread-2").unwrap().unwrap();
        assert_eq!(bread.status, TimerStatus::Running);
        assert_eq!(bread.remaining_seconds, 3);

        advance_ticks(3).await;
        let bread = registry.get_timer("bread-2").unwrap().unwrap();
        assert_eq!(bread.status, TimerStatus::Completed);
        assert_eq!(
            registry.get_timer("stew-1").unwrap().unwrap().remaining_seconds,
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completed_timer_stays_until_cancelled() {
        let registry = TimerRegistry::new();

        registry.start("r1-0", 0, 1).unwrap();
        settle().await;
        advance_ticks(1).await;
        assert!(registry.get_timer("r1-0").unwrap().unwrap().is_completed());

        registry.cancel("r1-0").unwrap().unwrap();
        assert_eq!(registry.get_timer("r1-0"), Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_every_driver() {
        let registry = TimerRegistry::new();
        let mut events = registry.subscribe_events();

        registry.start("stew-1", 1, 5).unwrap();
        registry.start("bread-2", 2, 5).unwrap();
        settle().await;

        registry.shutdown().unwrap();
        assert_eq!(registry.list_timers(), Ok(Vec::new()));

        drain(&mut events);
        advance_ticks(10).await;
        assert_eq!(drain(&mut events).len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_snapshot_tracks_ticks() {
        let registry = TimerRegistry::new();
        let watcher = registry.watch_timers();

        registry.start("r1-0", 0, 3).unwrap();
        settle().await;
        advance_ticks(1).await;

        let snapshot = watcher.borrow().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].remaining_seconds, 2);
    }
}
