//! Reactive binding between the controller and display components.
//!
//! `ConfigPublisher` is the read side of the control loop: visual
//! components call `current()` to gate expensive effects and register
//! `on_change` callbacks to be re-invoked whenever the controller
//! commits a new configuration.
//!
//! Consumers always observe a config that was valid at some point in
//! causal order - the controller replaces the `QualityConfig` wholesale
//! on every commit, so no reader can see a torn, partially-updated value.

use std::sync::Arc;

use crate::controller::{AdaptiveController, QualityConfig};
use crate::telemetry::Subscription;

/// Read-only facade over the controller's published configuration.
///
/// Cheap to clone and hand to every visual component.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use framewarden::clock::SessionClock;
/// use framewarden::controller::{AdaptiveController, ControllerTuning};
/// use framewarden::profile::CapabilityTier;
/// use framewarden::publisher::ConfigPublisher;
///
/// let controller = Arc::new(AdaptiveController::new(
///     CapabilityTier::Medium,
///     ControllerTuning::default(),
///     SessionClock::new(),
/// ));
/// let publisher = ConfigPublisher::new(controller);
///
/// let config = publisher.current();
/// if config.effects_enabled {
///     // render particles up to config.particle_density
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigPublisher {
    controller: Arc<AdaptiveController>,
}

impl ConfigPublisher {
    /// Create a publisher backed by the given controller.
    pub fn new(controller: Arc<AdaptiveController>) -> Self {
        Self { controller }
    }

    /// Snapshot of the currently published configuration.
    pub fn current(&self) -> QualityConfig {
        self.controller.current_config()
    }

    /// Register a callback invoked on every committed config change.
    ///
    /// The callback receives the complete replacement config. Release
    /// (or drop) the returned subscription to stop delivery; release is
    /// idempotent.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&QualityConfig) + Send + Sync + 'static,
    {
        self.controller.on_change(callback)
    }
}
