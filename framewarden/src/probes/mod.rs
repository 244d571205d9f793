//! Built-in sample producers.
//!
//! Two producers cover the telemetry kinds the embedding application
//! does not report itself:
//!
//! - `FrameClock` - the render loop calls `tick()` once per frame; the
//!   delta between consecutive ticks becomes a frame-time sample.
//! - `MemoryProbe` - a background task that polls host memory usage at
//!   a fixed interval and publishes memory samples until cancelled.
//!
//! Both publish through the hub's fire-and-forget path and never block
//! the caller.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::System;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::SessionClock;
use crate::sample::RawSample;
use crate::telemetry::TelemetryHub;

/// Default polling interval for the memory probe.
pub const DEFAULT_MEMORY_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Frame-time producer driven by the host render loop.
///
/// The first tick only anchors the clock; every subsequent tick
/// publishes the elapsed time since the previous one as a frame sample.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use framewarden::clock::SessionClock;
/// use framewarden::probes::FrameClock;
/// use framewarden::telemetry::TelemetryHub;
///
/// let hub = Arc::new(TelemetryHub::new());
/// let frames = FrameClock::new(Arc::clone(&hub), SessionClock::new());
///
/// frames.tick(); // anchor only
/// frames.tick(); // publishes one frame sample
/// assert_eq!(hub.metrics().samples_accepted, 1);
/// ```
pub struct FrameClock {
    hub: Arc<TelemetryHub>,
    clock: SessionClock,
    last_tick_ms: Mutex<Option<f64>>,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("last_tick_ms", &*self.last_tick_ms.lock())
            .finish_non_exhaustive()
    }
}

impl FrameClock {
    /// Create a frame clock publishing into the given hub.
    pub fn new(hub: Arc<TelemetryHub>, clock: SessionClock) -> Self {
        Self {
            hub,
            clock,
            last_tick_ms: Mutex::new(None),
        }
    }

    /// Mark a frame boundary.
    ///
    /// Publishes the time since the previous tick; the first tick after
    /// creation or `reset()` publishes nothing.
    pub fn tick(&self) {
        let now = self.clock.now_ms();
        let previous = self.last_tick_ms.lock().replace(now);

        if let Some(previous) = previous {
            self.hub.publish(RawSample::frame(now - previous, now));
        }
    }

    /// Forget the previous tick (e.g. after the app was backgrounded,
    /// so the idle gap is not reported as one enormous frame).
    pub fn reset(&self) {
        *self.last_tick_ms.lock() = None;
    }
}

/// Periodic memory-usage producer.
///
/// Runs as a cooperative background task: sleeps between polls and
/// exits promptly when the cancellation token fires.
pub struct MemoryProbe {
    hub: Arc<TelemetryHub>,
    clock: SessionClock,
    interval: Duration,
}

impl std::fmt::Debug for MemoryProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProbe")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl MemoryProbe {
    /// Create a probe publishing into the given hub.
    pub fn new(hub: Arc<TelemetryHub>, clock: SessionClock, interval: Duration) -> Self {
        Self {
            hub,
            clock,
            interval,
        }
    }

    /// Poll memory usage until cancelled.
    pub async fn run(self, cancellation: CancellationToken) {
        let mut system = System::new();
        debug!(interval_ms = self.interval.as_millis() as u64, "Memory probe started");

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    debug!("Memory probe stopped");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    system.refresh_memory();
                    let used = system.used_memory();
                    self.hub
                        .publish(RawSample::memory(used as f64, self.clock.now_ms()));
                }
            }
        }
    }
}
