//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::clock::SessionClock;
use crate::controller::AdaptiveController;
use crate::probes::{FrameClock, MemoryProbe};
use crate::profile::{classify, CapabilityTier, HostProbe, SignalSource};
use crate::publisher::ConfigPublisher;
use crate::telemetry::{Subscription, TelemetryHub};
use crate::timer::InteractionTimer;

/// The adaptive performance subsystem, owned for one session.
///
/// Everything hangs off this instance: the device tier, the telemetry
/// hub, the controller wired to it, and the producer/consumer handles
/// the embedding application distributes to its collaborators. All
/// state is in-memory and process-scoped; a new session builds a new
/// app.
pub struct FramewardenApp {
    tier: CapabilityTier,
    clock: SessionClock,
    hub: Arc<TelemetryHub>,
    timer: InteractionTimer,
    frame_clock: Arc<FrameClock>,
    controller: Arc<AdaptiveController>,
    publisher: ConfigPublisher,

    /// Keeps the controller attached to the hub for the app's lifetime.
    #[allow(dead_code)]
    controller_subscription: Subscription,

    /// Memory probe task (when enabled).
    probe_task: Option<JoinHandle<()>>,

    /// Cancels background probes on shutdown.
    cancellation: CancellationToken,
}

impl std::fmt::Debug for FramewardenApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramewardenApp")
            .field("tier", &self.tier)
            .field("memory_probe", &self.probe_task.is_some())
            .finish_non_exhaustive()
    }
}

impl FramewardenApp {
    /// Start the subsystem.
    ///
    /// Classification runs exactly once here; the tier is cached for
    /// the session. When `config.memory_probe_interval` is set, the
    /// probe is spawned on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `AppError::Config` if `window_capacity` is zero
    /// - `AppError::RuntimeUnavailable` if the memory probe is enabled
    ///   but no Tokio runtime is active
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        if config.window_capacity == 0 {
            return Err(AppError::Config(
                "window_capacity must be at least 1".to_string(),
            ));
        }

        let signals = config.signals.unwrap_or_else(|| HostProbe::new().signals());
        let tier = classify(&signals);
        info!(
            %tier,
            processors = ?signals.processors,
            memory_gib = ?signals.memory_gib,
            "Device classified"
        );

        let clock = SessionClock::new();
        let hub = Arc::new(TelemetryHub::with_window_capacity(config.window_capacity));
        let controller = Arc::new(AdaptiveController::new(tier, config.tuning, clock));
        let controller_subscription = controller.attach(&hub);
        let publisher = ConfigPublisher::new(Arc::clone(&controller));
        let timer = InteractionTimer::new(Arc::clone(&hub), clock);
        let frame_clock = Arc::new(FrameClock::new(Arc::clone(&hub), clock));

        let cancellation = CancellationToken::new();
        let probe_task = match config.memory_probe_interval {
            Some(interval) => {
                let handle = tokio::runtime::Handle::try_current()
                    .map_err(|_| AppError::RuntimeUnavailable)?;
                let probe = MemoryProbe::new(Arc::clone(&hub), clock, interval);
                Some(handle.spawn(probe.run(cancellation.clone())))
            }
            None => None,
        };

        Ok(Self {
            tier,
            clock,
            hub,
            timer,
            frame_clock,
            controller,
            publisher,
            controller_subscription,
            probe_task,
            cancellation,
        })
    }

    /// The capability tier computed at startup.
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// The session clock shared by all producers.
    pub fn clock(&self) -> SessionClock {
        self.clock
    }

    /// The telemetry hub, for custom producers and diagnostics readers.
    pub fn hub(&self) -> Arc<TelemetryHub> {
        Arc::clone(&self.hub)
    }

    /// The interaction timer for UI code.
    pub fn interaction_timer(&self) -> InteractionTimer {
        self.timer.clone()
    }

    /// The frame clock for the render loop.
    pub fn frame_clock(&self) -> Arc<FrameClock> {
        Arc::clone(&self.frame_clock)
    }

    /// The config publisher for visual components.
    pub fn config_publisher(&self) -> ConfigPublisher {
        self.publisher.clone()
    }

    /// The controller itself, for direct evaluation in tests and tools.
    pub fn controller(&self) -> Arc<AdaptiveController> {
        Arc::clone(&self.controller)
    }

    /// Tear the subsystem down.
    ///
    /// Cancels background probes and detaches the controller from the
    /// hub (the subscription releases on drop). Handles already given
    /// out keep working against the final configuration; they just stop
    /// adapting.
    pub fn shutdown(self) {
        self.cancellation.cancel();
        if let Some(task) = self.probe_task {
            task.abort();
        }
        info!("Framewarden shut down");
    }
}
