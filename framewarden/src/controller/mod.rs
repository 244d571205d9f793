//! Adaptive quality controller.
//!
//! The controller consumes validated aggregate metrics from the
//! telemetry hub and maintains the session's `QualityConfig`, applying
//! hysteresis-bounded transitions between quality levels.
//!
//! # Control Algorithm
//!
//! On every metrics update:
//!
//! 1. **Memory override**: a reading above the tier's high-water mark
//!    forces quality level 1 immediately, bypassing dwell and the
//!    single-step rule. This is the only multi-step transition.
//! 2. **Fps pressure**: fps below the degrade threshold builds downgrade
//!    pressure (below the severe threshold, the shorter severe dwell
//!    applies); fps at or above the upgrade threshold builds upgrade
//!    pressure. Anything between is neutral and clears pending pressure.
//! 3. **Hysteresis**: pressure must hold for its dwell time, measured
//!    from whichever is later of the pressure's onset and the last
//!    transition, before a single-step level change commits. Upgrades
//!    require both a wider fps margin and a longer dwell than
//!    downgrades - it is easier to degrade than to recover.
//! 4. Derived fields are recomputed as a pure function of the new level
//!    and the capability tier; the config is published only when it
//!    differs from the previous one.
//!
//! Missing or zeroed metrics mean "no pressure": a corrupt update
//! degrades adaptability, never stability.

mod quality;
mod tuning;

pub use quality::{
    baseline_level, derive_config, sampling_rate, QualityConfig, MAX_QUALITY_LEVEL,
    MIN_QUALITY_LEVEL,
};
pub use tuning::ControllerTuning;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::clock::SessionClock;
use crate::profile::CapabilityTier;
use crate::telemetry::{AggregateMetrics, Broadcaster, Subscription, TelemetryHub};

/// Direction of accumulated quality pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressureDirection {
    Down,
    Up,
}

/// Instantaneous pressure reading for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pressure {
    SevereDown,
    Down,
    Up,
}

impl Pressure {
    fn direction(self) -> PressureDirection {
        match self {
            Pressure::SevereDown | Pressure::Down => PressureDirection::Down,
            Pressure::Up => PressureDirection::Up,
        }
    }
}

struct ControllerState {
    level: u8,
    config: QualityConfig,
    /// Session-clock time of the last committed transition.
    last_transition_ms: f64,
    /// Pending pressure: direction and onset time.
    pending: Option<(PressureDirection, f64)>,
}

/// Closed-loop controller owning the session's `QualityConfig`.
///
/// Initialized from the capability tier's baseline level; thereafter
/// mutates the config at most once per evaluation. All reads receive
/// snapshots.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use framewarden::clock::SessionClock;
/// use framewarden::controller::{AdaptiveController, ControllerTuning};
/// use framewarden::profile::CapabilityTier;
/// use framewarden::telemetry::TelemetryHub;
///
/// let hub = TelemetryHub::new();
/// let controller = Arc::new(AdaptiveController::new(
///     CapabilityTier::High,
///     ControllerTuning::default(),
///     SessionClock::new(),
/// ));
/// let _sub = controller.attach(&hub);
///
/// assert_eq!(controller.current_config().quality_level, 4);
/// ```
pub struct AdaptiveController {
    tier: CapabilityTier,
    tuning: ControllerTuning,
    clock: SessionClock,
    state: Mutex<ControllerState>,
    broadcaster: Broadcaster<QualityConfig>,
}

impl std::fmt::Debug for AdaptiveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveController")
            .field("tier", &self.tier)
            .field("level", &self.state.lock().level)
            .finish_non_exhaustive()
    }
}

impl AdaptiveController {
    /// Create a controller seeded from the tier's baseline level.
    pub fn new(tier: CapabilityTier, tuning: ControllerTuning, clock: SessionClock) -> Self {
        let level = baseline_level(tier);
        let config = derive_config(level, tier);
        info!(%tier, level, "Adaptive controller initialized");

        Self {
            tier,
            tuning,
            clock,
            state: Mutex::new(ControllerState {
                level,
                config,
                last_transition_ms: clock.now_ms(),
                pending: None,
            }),
            broadcaster: Broadcaster::new(),
        }
    }

    /// The capability tier this controller was seeded with.
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Snapshot of the current configuration.
    pub fn current_config(&self) -> QualityConfig {
        self.state.lock().config.clone()
    }

    /// Subscribe to configuration changes.
    ///
    /// The callback receives the complete replacement config; it fires
    /// only when the config actually differs from the previous one.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&QualityConfig) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(callback)
    }

    /// Wire this controller to a telemetry hub.
    ///
    /// Every aggregate update triggers one synchronous evaluation. Drop
    /// or release the returned subscription to detach.
    pub fn attach(self: &Arc<Self>, hub: &TelemetryHub) -> Subscription {
        let controller = Arc::clone(self);
        hub.subscribe(move |metrics| controller.evaluate(metrics))
    }

    /// Run one control-loop evaluation against a metrics snapshot.
    ///
    /// Never panics: missing fields read as "no pressure".
    pub fn evaluate(&self, metrics: &AggregateMetrics) {
        let changed = {
            let mut state = self.state.lock();
            self.evaluate_locked(&mut state, metrics)
        };

        // Notify outside the lock so consumers may read the controller.
        if let Some(config) = changed {
            self.broadcaster.emit(&config);
        }
    }

    fn evaluate_locked(
        &self,
        state: &mut ControllerState,
        metrics: &AggregateMetrics,
    ) -> Option<QualityConfig> {
        let now = self.clock.now_ms();

        // Memory pressure overrides fps reasoning entirely: force level 1
        // regardless of dwell, the one transition allowed to jump levels.
        if metrics.memory_usage_bytes > self.tuning.memory_high_water(self.tier) {
            state.pending = None;
            if state.level > MIN_QUALITY_LEVEL {
                warn!(
                    memory_bytes = metrics.memory_usage_bytes,
                    high_water = self.tuning.memory_high_water(self.tier),
                    from = state.level,
                    "Memory high-water mark exceeded, forcing minimum quality"
                );
                return Some(self.commit(state, MIN_QUALITY_LEVEL, now));
            }
            return None;
        }

        let Some(pressure) = self.fps_pressure(metrics) else {
            state.pending = None;
            return None;
        };

        let direction = pressure.direction();
        let onset = match state.pending {
            Some((pending_direction, onset)) if pending_direction == direction => onset,
            _ => {
                state.pending = Some((direction, now));
                debug!(?direction, fps = metrics.fps, "Quality pressure onset");
                now
            }
        };

        // Dwell counts from the later of pressure onset and last transition,
        // so consecutive steps each earn their own dwell.
        let held_since = onset.max(state.last_transition_ms);
        let dwell = match pressure {
            Pressure::SevereDown => self.tuning.severe_dwell,
            Pressure::Down => self.tuning.downgrade_dwell,
            Pressure::Up => self.tuning.upgrade_dwell,
        };
        if now - held_since < dwell.as_secs_f64() * 1000.0 {
            return None;
        }

        let new_level = match direction {
            PressureDirection::Down => state.level.saturating_sub(1).max(MIN_QUALITY_LEVEL),
            PressureDirection::Up => (state.level + 1).min(MAX_QUALITY_LEVEL),
        };
        if new_level == state.level {
            // Already at the bound; nothing to commit.
            return None;
        }

        info!(
            from = state.level,
            to = new_level,
            fps = format!("{:.1}", metrics.fps),
            "Quality level transition"
        );
        Some(self.commit(state, new_level, now))
    }

    /// Instantaneous fps pressure, or `None` when neutral or unmeasured.
    fn fps_pressure(&self, metrics: &AggregateMetrics) -> Option<Pressure> {
        let fps = metrics.fps;
        if !fps.is_finite() || fps <= 0.0 {
            // No frame data yet (or a corrupt snapshot): no pressure.
            return None;
        }

        if fps < self.tuning.severe_degrade_fps {
            Some(Pressure::SevereDown)
        } else if fps < self.tuning.degrade_fps {
            Some(Pressure::Down)
        } else if fps >= self.tuning.upgrade_fps {
            Some(Pressure::Up)
        } else {
            None
        }
    }

    fn commit(&self, state: &mut ControllerState, level: u8, now: f64) -> QualityConfig {
        state.level = level;
        state.config = derive_config(level, self.tier);
        state.last_transition_ms = now;
        state.pending = None;
        state.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    /// Tuning with millisecond dwells so tests run quickly.
    fn fast_tuning() -> ControllerTuning {
        ControllerTuning {
            downgrade_dwell: Duration::from_millis(20),
            severe_dwell: Duration::from_millis(10),
            upgrade_dwell: Duration::from_millis(40),
            ..Default::default()
        }
    }

    fn controller(tier: CapabilityTier) -> Arc<AdaptiveController> {
        Arc::new(AdaptiveController::new(
            tier,
            fast_tuning(),
            SessionClock::new(),
        ))
    }

    fn metrics_with_fps(fps: f64) -> AggregateMetrics {
        let mut metrics = AggregateMetrics::default();
        metrics.set_frame_average(1000.0 / fps);
        metrics
    }

    fn metrics_with_memory(bytes: u64) -> AggregateMetrics {
        AggregateMetrics {
            memory_usage_bytes: bytes,
            ..Default::default()
        }
    }

    /// Evaluate a fixed fps repeatedly until the level changes (with a
    /// hard deadline so a broken controller cannot hang the test).
    fn sustain_until_transition(controller: &AdaptiveController, fps: f64) -> u8 {
        let start_level = controller.current_config().quality_level;
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            controller.evaluate(&metrics_with_fps(fps));
            let level = controller.current_config().quality_level;
            if level != start_level {
                return level;
            }
            assert!(Instant::now() < deadline, "no transition within deadline");
            sleep(Duration::from_millis(2));
        }
    }

    /// Evaluate a fixed fps only while `window` has not yet elapsed, so
    /// the dwell can provably not have been met during any evaluation.
    fn sustain_for_at_most(controller: &AdaptiveController, fps: f64, window: Duration) {
        let start = Instant::now();
        while start.elapsed() < window {
            controller.evaluate(&metrics_with_fps(fps));
            sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_initial_config_matches_tier_baseline() {
        assert_eq!(
            controller(CapabilityTier::Low).current_config().quality_level,
            1
        );
        assert_eq!(
            controller(CapabilityTier::Medium)
                .current_config()
                .quality_level,
            3
        );
        assert_eq!(
            controller(CapabilityTier::High)
                .current_config()
                .quality_level,
            4
        );
    }

    #[test]
    fn test_no_change_before_dwell_elapses() {
        let controller = controller(CapabilityTier::High);

        // Every evaluation happens within half the dwell window.
        sustain_for_at_most(&controller, 30.0, Duration::from_millis(10));

        assert_eq!(controller.current_config().quality_level, 4);
    }

    #[test]
    fn test_sustained_pressure_drops_exactly_one_level() {
        let controller = controller(CapabilityTier::High);

        // The first committed transition is a single step down.
        assert_eq!(sustain_until_transition(&controller, 30.0), 3);
    }

    #[test]
    fn test_fps_path_never_skips_levels() {
        let controller = controller(CapabilityTier::High);
        let levels = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&levels);
        let _sub = controller.on_change(move |config| seen.lock().push(config.quality_level));

        // fps=20 is severe pressure; ride it all the way to the floor.
        while controller.current_config().quality_level > MIN_QUALITY_LEVEL {
            sustain_until_transition(&controller, 20.0);
        }

        // Strictly one step at a time: 3, 2, 1 - never straight to 1.
        assert_eq!(*levels.lock(), vec![3, 2, 1]);
    }

    #[test]
    fn test_neutral_fps_clears_pending_pressure() {
        let controller = controller(CapabilityTier::High);

        controller.evaluate(&metrics_with_fps(30.0));
        sleep(Duration::from_millis(15));
        // Neutral reading resets the onset before the dwell elapses.
        controller.evaluate(&metrics_with_fps(50.0));
        sleep(Duration::from_millis(15));
        // New onset; no later evaluation arrives, so nothing can commit.
        controller.evaluate(&metrics_with_fps(30.0));

        assert_eq!(controller.current_config().quality_level, 4);
    }

    #[test]
    fn test_memory_override_jumps_to_minimum_immediately() {
        let controller = controller(CapabilityTier::High);
        let high_water = fast_tuning().memory_high_water(CapabilityTier::High);

        // Single reading above the mark, no dwell needed.
        controller.evaluate(&metrics_with_memory(high_water + 1));

        let config = controller.current_config();
        assert_eq!(config.quality_level, 1);
        assert!(!config.effects_enabled);
    }

    #[test]
    fn test_memory_override_at_minimum_is_quiet() {
        let controller = controller(CapabilityTier::Low);
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let _sub = controller.on_change(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let high_water = fast_tuning().memory_high_water(CapabilityTier::Low);
        controller.evaluate(&metrics_with_memory(high_water + 1));
        controller.evaluate(&metrics_with_memory(high_water + 1));

        // Already at level 1: no redundant notifications.
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_upgrade_requires_longer_dwell() {
        let controller = controller(CapabilityTier::Medium);

        // Healthy fps held for less than the upgrade dwell: no change.
        sustain_for_at_most(&controller, 60.0, Duration::from_millis(20));
        assert_eq!(controller.current_config().quality_level, 3);

        // Kept up past the dwell: exactly one step up.
        assert_eq!(sustain_until_transition(&controller, 60.0), 4);
    }

    #[test]
    fn test_upgrade_stops_at_maximum() {
        let controller = controller(CapabilityTier::High);

        assert_eq!(sustain_until_transition(&controller, 60.0), 5);

        // Well past another upgrade dwell: still capped at 5.
        sustain_for_at_most(&controller, 60.0, Duration::from_millis(120));
        assert_eq!(controller.current_config().quality_level, 5);
    }

    #[test]
    fn test_empty_metrics_mean_no_pressure() {
        let controller = controller(CapabilityTier::Medium);

        for _ in 0..10 {
            controller.evaluate(&AggregateMetrics::default());
            sleep(Duration::from_millis(5));
        }

        assert_eq!(controller.current_config().quality_level, 3);
    }

    #[test]
    fn test_change_notifications_carry_whole_config() {
        let controller = controller(CapabilityTier::High);
        let observed = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&observed);
        let _sub = controller.on_change(move |config| seen.lock().push(config.clone()));

        sustain_until_transition(&controller, 30.0);

        let observed = observed.lock();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0], derive_config(3, CapabilityTier::High));
    }

    #[test]
    fn test_attach_drives_evaluation_from_hub() {
        let hub = TelemetryHub::with_window_capacity(4);
        let controller = controller(CapabilityTier::High);
        let sub = controller.attach(&hub);

        // 25ms frames = 40 fps, below the degrade threshold.
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut timestamp = 0.0;
        while controller.current_config().quality_level == 4 {
            timestamp += 25.0;
            hub.publish(crate::sample::RawSample::frame(25.0, timestamp));
            assert!(Instant::now() < deadline, "hub never drove a transition");
            sleep(Duration::from_millis(2));
        }
        assert_eq!(controller.current_config().quality_level, 3);

        // Detached controller no longer reacts.
        sub.release();
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(60) {
            timestamp += 25.0;
            hub.publish(crate::sample::RawSample::frame(25.0, timestamp));
            sleep(Duration::from_millis(2));
        }
        assert_eq!(controller.current_config().quality_level, 3);
    }
}
