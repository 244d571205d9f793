//! Application configuration.

use std::time::Duration;

use crate::controller::ControllerTuning;
use crate::probes::DEFAULT_MEMORY_PROBE_INTERVAL;
use crate::profile::DeviceSignals;
use crate::telemetry::DEFAULT_WINDOW_CAPACITY;

/// Configuration for `FramewardenApp::start`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Explicit device signals.
    ///
    /// `None` probes the host. Supply signals when the embedding layer
    /// knows more than the host probe can see (network class, pointer
    /// type) or in tests.
    pub signals: Option<DeviceSignals>,

    /// Controller tuning; defaults fix the asymmetric thresholds.
    pub tuning: ControllerTuning,

    /// Rolling diagnostics window size per sample kind.
    /// Range: 1 - 10000
    pub window_capacity: usize,

    /// Memory probe polling interval; `None` disables the probe
    /// (the embedding layer may publish memory samples itself).
    pub memory_probe_interval: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            signals: None,
            tuning: ControllerTuning::default(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            memory_probe_interval: Some(DEFAULT_MEMORY_PROBE_INTERVAL),
        }
    }
}
