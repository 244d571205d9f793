//! Aggregate metrics derived from accepted samples.

use std::collections::HashMap;

use serde::Serialize;

/// Per-interaction summary statistics.
///
/// Invariant: `average_time_ms == total_time_ms / count` holds exactly
/// for every entry after every fold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionStats {
    /// Number of completed interactions observed.
    pub count: u64,
    /// Sum of all observed durations (milliseconds).
    pub total_time_ms: f64,
    /// Mean duration (milliseconds).
    pub average_time_ms: f64,
}

impl InteractionStats {
    /// Fold one interaction duration into the stats.
    pub(crate) fn record(&mut self, duration_ms: f64) {
        self.count += 1;
        self.total_time_ms += duration_ms;
        self.average_time_ms = self.total_time_ms / self.count as f64;
    }
}

/// Rolling summary of accepted telemetry, owned exclusively by the hub.
///
/// Subscribers and external readers always receive a cloned snapshot,
/// never a live reference, so no reader can observe a torn update.
/// Counts and totals are monotonically non-decreasing within an epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateMetrics {
    /// Mean frame time over the rolling window (ms); 0 before any frame.
    pub average_frame_time_ms: f64,

    /// Frames per second derived from the rolling mean; 0 before any frame.
    pub fps: f64,

    /// Most recent memory usage reading (bytes); 0 before any reading.
    pub memory_usage_bytes: u64,

    /// Per-interaction statistics keyed by interaction name.
    pub interaction_stats: HashMap<String, InteractionStats>,

    /// Samples accepted by validation this epoch.
    pub samples_accepted: u64,

    /// Samples rejected by validation this epoch (diagnostics only).
    pub samples_rejected: u64,
}

impl AggregateMetrics {
    /// Update the frame-rate fields from a rolling window mean.
    pub(crate) fn set_frame_average(&mut self, average_ms: f64) {
        self.average_frame_time_ms = average_ms;
        self.fps = if average_ms > 0.0 {
            1000.0 / average_ms
        } else {
            0.0
        };
    }
}
