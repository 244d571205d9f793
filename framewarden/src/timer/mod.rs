//! Per-interaction stopwatch feeding the telemetry hub.
//!
//! UI code brackets a user interaction with `start(name)` and invokes
//! the returned handle's `stop()` when the interaction completes. The
//! elapsed time is published to the hub as an `interaction` sample.
//!
//! # Semantics
//!
//! - `stop()` is a no-op after the first call.
//! - Starting a name that already has a pending timer overwrites the
//!   start time (last-start-wins). The superseded handle's `stop()`
//!   reports nothing: the abandoned duration is never published. This
//!   is deliberate - re-entry of an interaction restarts its clock.
//! - Dropping an unstopped handle reports nothing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::clock::SessionClock;
use crate::sample::RawSample;
use crate::telemetry::TelemetryHub;

struct PendingStart {
    started_ms: f64,
    generation: u64,
}

#[derive(Default)]
struct TimerState {
    pending: HashMap<String, PendingStart>,
    next_generation: u64,
}

/// Named-interaction stopwatch.
///
/// Cheap to clone; clones share the same pending-timer state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use framewarden::clock::SessionClock;
/// use framewarden::telemetry::TelemetryHub;
/// use framewarden::timer::InteractionTimer;
///
/// let hub = Arc::new(TelemetryHub::new());
/// let timer = InteractionTimer::new(Arc::clone(&hub), SessionClock::new());
///
/// let mut stop = timer.start("save");
/// // ... user interaction runs ...
/// stop.stop();
///
/// assert_eq!(hub.metrics().interaction_stats["save"].count, 1);
/// ```
#[derive(Clone)]
pub struct InteractionTimer {
    hub: Arc<TelemetryHub>,
    clock: SessionClock,
    state: Arc<Mutex<TimerState>>,
}

impl std::fmt::Debug for InteractionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionTimer")
            .field("pending", &self.state.lock().pending.len())
            .finish_non_exhaustive()
    }
}

impl InteractionTimer {
    /// Create a timer publishing into the given hub.
    pub fn new(hub: Arc<TelemetryHub>, clock: SessionClock) -> Self {
        Self {
            hub,
            clock,
            state: Arc::new(Mutex::new(TimerState::default())),
        }
    }

    /// Start (or restart) the timer for a named interaction.
    ///
    /// Returns the handle that reports the duration on `stop()`. If a
    /// timer for this name is already pending, its start time is
    /// overwritten and the earlier handle becomes inert.
    pub fn start(&self, name: impl Into<String>) -> StopHandle {
        let name = name.into();
        let now = self.clock.now_ms();

        let generation = {
            let mut state = self.state.lock();
            let generation = state.next_generation;
            state.next_generation += 1;

            if state.pending.contains_key(&name) {
                trace!(interaction = %name, "Restarting pending interaction timer");
            }
            state.pending.insert(
                name.clone(),
                PendingStart {
                    started_ms: now,
                    generation,
                },
            );
            generation
        };

        StopHandle {
            hub: Arc::clone(&self.hub),
            clock: self.clock,
            state: Arc::clone(&self.state),
            name,
            generation,
            fired: false,
        }
    }

    /// Number of interactions with a pending (unstopped) timer.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// Handle completing one started interaction.
///
/// `stop()` publishes the elapsed time once; later calls are no-ops.
/// A handle superseded by a newer `start` of the same name publishes
/// nothing.
pub struct StopHandle {
    hub: Arc<TelemetryHub>,
    clock: SessionClock,
    state: Arc<Mutex<TimerState>>,
    name: String,
    generation: u64,
    fired: bool,
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("name", &self.name)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl StopHandle {
    /// Stop the interaction and publish its duration.
    ///
    /// No-op if already stopped or if a newer `start` for the same name
    /// superseded this handle.
    pub fn stop(&mut self) {
        if self.fired {
            return;
        }
        self.fired = true;

        let started_ms = {
            let mut state = self.state.lock();
            match state.pending.get(&self.name) {
                Some(pending) if pending.generation == self.generation => {
                    let started = pending.started_ms;
                    state.pending.remove(&self.name);
                    Some(started)
                }
                _ => None,
            }
        };

        let Some(started_ms) = started_ms else {
            trace!(interaction = %self.name, "Superseded interaction stop ignored");
            return;
        };

        let now = self.clock.now_ms();
        let elapsed = (now - started_ms).max(0.0);
        self.hub
            .publish(RawSample::interaction(self.name.clone(), elapsed, now));
    }
}
