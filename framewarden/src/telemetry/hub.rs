//! The telemetry hub: validate, fold, fan out.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::sample::{PerformanceSample, RawSample, SampleKind, SampleValidator};

use super::aggregate::AggregateMetrics;
use super::broadcaster::{Broadcaster, Subscription};

/// Default bound on the per-kind rolling sample window.
///
/// Roughly two seconds of frame samples at 60 fps. The window exists for
/// trend diagnostics and the frame-time average only; individual samples
/// are never retained beyond it.
pub const DEFAULT_WINDOW_CAPACITY: usize = 120;

struct HubState {
    validator: SampleValidator,
    metrics: AggregateMetrics,
    windows: HashMap<SampleKind, VecDeque<PerformanceSample>>,
    /// Running sum of the frame window, so folding stays O(1).
    frame_window_sum_ms: f64,
}

impl HubState {
    fn new() -> Self {
        Self {
            validator: SampleValidator::new(),
            metrics: AggregateMetrics::default(),
            windows: HashMap::new(),
            frame_window_sum_ms: 0.0,
        }
    }
}

/// Process-wide broadcaster of performance samples.
///
/// Owns the `AggregateMetrics` exclusively; all external reads receive
/// a snapshot. `publish` is fire-and-forget: validation failures are
/// counted and logged, never surfaced to the producer.
///
/// # Example
///
/// ```
/// use framewarden::telemetry::TelemetryHub;
/// use framewarden::sample::RawSample;
///
/// let hub = TelemetryHub::new();
/// let _sub = hub.subscribe(|metrics| {
///     println!("fps: {:.1}", metrics.fps);
/// });
///
/// hub.publish(RawSample::frame(16.7, 1.0));
/// assert_eq!(hub.metrics().samples_accepted, 1);
/// ```
pub struct TelemetryHub {
    window_capacity: usize,
    state: Mutex<HubState>,
    broadcaster: Broadcaster<AggregateMetrics>,
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TelemetryHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryHub")
            .field("window_capacity", &self.window_capacity)
            .field("subscribers", &self.broadcaster.listener_count())
            .finish_non_exhaustive()
    }
}

impl TelemetryHub {
    /// Create a hub with the default rolling window capacity.
    pub fn new() -> Self {
        Self::with_window_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Create a hub with a specific rolling window capacity (minimum 1).
    pub fn with_window_capacity(window_capacity: usize) -> Self {
        Self {
            window_capacity: window_capacity.max(1),
            state: Mutex::new(HubState::new()),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Publish a raw sample.
    ///
    /// Fire-and-forget: a sample that fails validation is dropped from
    /// the control-affecting aggregates, counted for diagnostics, and
    /// logged at debug level. Accepted samples fold into the aggregates
    /// and all subscribers are notified synchronously, in registration
    /// order, with the updated snapshot.
    pub fn publish(&self, raw: RawSample) {
        let snapshot = {
            let mut state = self.state.lock();

            let sample = match state.validator.validate(&raw) {
                Ok(sample) => sample,
                Err(reason) => {
                    state.metrics.samples_rejected += 1;
                    debug!(kind = %raw.kind, %reason, "Dropping rejected telemetry sample");
                    return;
                }
            };

            self.fold(&mut state, sample);
            state.metrics.clone()
        };

        // Deliver outside the lock so subscribers may read the hub.
        self.broadcaster.emit(&snapshot);
    }

    /// Fold an accepted sample into the aggregates and its window.
    fn fold(&self, state: &mut HubState, sample: PerformanceSample) {
        state.metrics.samples_accepted += 1;

        match sample.kind {
            SampleKind::Frame => {
                state.frame_window_sum_ms += sample.value;
            }
            SampleKind::Memory => {
                state.metrics.memory_usage_bytes = sample.value as u64;
            }
            SampleKind::Interaction => {
                if let Some(name) = &sample.name {
                    state
                        .metrics
                        .interaction_stats
                        .entry(name.clone())
                        .or_default()
                        .record(sample.value);
                }
            }
        }

        let capacity = self.window_capacity;
        let window = state.windows.entry(sample.kind).or_default();
        window.push_back(sample);
        while window.len() > capacity {
            if let Some(evicted) = window.pop_front() {
                if evicted.kind == SampleKind::Frame {
                    state.frame_window_sum_ms -= evicted.value;
                }
            }
        }

        if let Some(frames) = state.windows.get(&SampleKind::Frame) {
            if !frames.is_empty() {
                let average = state.frame_window_sum_ms / frames.len() as f64;
                state.metrics.set_frame_average(average);
            }
        }
    }

    /// Subscribe to aggregate updates.
    ///
    /// The callback runs synchronously on every accepted publish with a
    /// snapshot of the updated metrics. Panics in the callback are
    /// isolated per subscriber.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AggregateMetrics) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(callback)
    }

    /// Snapshot of the current aggregates.
    pub fn metrics(&self) -> AggregateMetrics {
        self.state.lock().metrics.clone()
    }

    /// Recent accepted samples of one kind (diagnostics window).
    pub fn recent_samples(&self, kind: SampleKind) -> Vec<PerformanceSample> {
        self.state
            .lock()
            .windows
            .get(&kind)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Start a fresh measurement epoch.
    ///
    /// Clears aggregates, diagnostics windows, and the validator's
    /// monotonicity state. Subscriptions are unaffected.
    pub fn begin_epoch(&self) {
        let mut state = self.state.lock();
        state.validator.reset();
        state.metrics = AggregateMetrics::default();
        state.windows.clear();
        state.frame_window_sum_ms = 0.0;
    }
}
