//! Stability scheduler
//!
//! Debounces rapidly changing input before expensive remote calls:
//! - `schedule` runs an action `delay` after the **last** call with the same key
//! - rescheduling a key restarts its timer with the new snapshot
//! - an action that already fired is never cancelled
//! - at most one action per key runs at a time
//! - nothing fires after `shutdown` or drop

use crate::error::SchedulerError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Independent debounce channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKey {
    /// Skill suggestions while the description is edited
    Suggestions,
    /// Scope analysis while description, goals or target skills change
    Analysis,
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleKey::Suggestions => f.write_str("suggestions"),
            ScheduleKey::Analysis => f.write_str("analysis"),
        }
    }
}

#[derive(Debug)]
struct Slot {
    /// Bumped by every schedule/cancel; a fired action only runs if it is still the latest
    generation: Arc<AtomicU64>,
    /// Cancels the timer of the pending action (never the action itself)
    pending: CancellationToken,
    /// Held while an action of this key is running
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl Slot {
    fn new(shutdown: &CancellationToken) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            pending: shutdown.child_token(),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// Keyed debounce timer
#[derive(Debug)]
pub struct StabilityScheduler {
    slots: Mutex<HashMap<ScheduleKey, Slot>>,
    shutdown: CancellationToken,
}

impl StabilityScheduler {
    /// Create new scheduler
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register `action(snapshot)` to run `delay` after the last call for `key`
    ///
    /// Replaces any timer still pending for `key`. Returns the generation
    /// number assigned to this registration.
    ///
    /// # Errors
    /// - `SchedulerError::ShutDown` after `shutdown`
    /// - `SchedulerError::NoRuntime` outside a Tokio runtime
    pub fn schedule<S, F, Fut>(
        &self,
        key: ScheduleKey,
        snapshot: S,
        delay: Duration,
        action: F,
    ) -> Result<u64, SchedulerError>
    where
        S: Send + 'static,
        F: FnOnce(S) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut slots = self.slots.lock();
        let slot = slots
            .entry(key)
            .or_insert_with(|| Slot::new(&self.shutdown));

        slot.pending.cancel();
        slot.pending = self.shutdown.child_token();
        let generation = slot.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let pending = slot.pending.clone();
        let latest = Arc::clone(&slot.generation);
        let gate = Arc::clone(&slot.gate);
        let shutdown = self.shutdown.clone();
        drop(slots);

        tracing::debug!(%key, generation, delay_ms = delay.as_millis() as u64, "timer armed");

        runtime.spawn(async move {
            tokio::select! {
                () = pending.cancelled() => {
                    tracing::trace!(%key, generation, "timer cancelled");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }

            let _in_flight = gate.lock().await;
            if shutdown.is_cancelled() {
                return;
            }
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(%key, generation, "superseded while waiting for previous action");
                return;
            }

            tracing::debug!(%key, generation, "firing");
            action(snapshot).await;
        });

        Ok(generation)
    }

    /// Cancel the pending timer for `key`; an action already running is left alone
    pub fn cancel(&self, key: ScheduleKey) {
        if let Some(slot) = self.slots.lock().get(&key) {
            slot.pending.cancel();
            slot.generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Latest generation registered for `key` (0 if never scheduled)
    #[must_use]
    pub fn generation(&self, key: ScheduleKey) -> u64 {
        self.slots
            .lock()
            .get(&key)
            .map_or(0, |slot| slot.generation.load(Ordering::SeqCst))
    }

    /// Cancel every pending timer and refuse further scheduling
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.slots.lock().clear();
    }

    /// Whether `shutdown` was called
    #[inline]
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled on `shutdown` or drop, for actions already running
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Default for StabilityScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StabilityScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
