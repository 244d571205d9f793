//! Tuning parameters for the adaptive controller.
//!
//! The control algorithm fixes the *role* of these values (asymmetric
//! up/down thresholds, single-step transitions, memory override); their
//! magnitudes are deployment-specific tuning and therefore live in
//! configuration rather than code.

use std::time::Duration;

use crate::profile::CapabilityTier;

/// Tuning parameters for quality-level transitions.
///
/// # Asymmetry
///
/// Degrading must be easier than upgrading, so a brief recovery never
/// bounces quality up only to drop it again:
///
/// - `upgrade_fps` sits further above `degrade_fps` than any downgrade
///   margin, and
/// - `upgrade_dwell` is longer than `downgrade_dwell`.
#[derive(Debug, Clone)]
pub struct ControllerTuning {
    /// Below this fps, downgrade pressure accumulates.
    /// Range: half to three-quarters of the frame-rate target
    pub degrade_fps: f64,

    /// Below this fps, pressure is severe and the shorter severe dwell
    /// applies. Transitions remain single-step.
    /// Range: well below `degrade_fps`
    pub severe_degrade_fps: f64,

    /// At or above this fps, upgrade pressure accumulates. Must exceed
    /// `degrade_fps` by a comfortable margin.
    pub upgrade_fps: f64,

    /// How long moderate downgrade pressure must hold before a
    /// single-step downgrade commits.
    pub downgrade_dwell: Duration,

    /// Dwell for severe downgrade pressure (shorter than
    /// `downgrade_dwell`).
    pub severe_dwell: Duration,

    /// Dwell for upgrade pressure (longest of the three).
    pub upgrade_dwell: Duration,

    /// Memory high-water mark for low-tier devices (bytes).
    pub memory_high_water_low: u64,

    /// Memory high-water mark for medium-tier devices (bytes).
    pub memory_high_water_medium: u64,

    /// Memory high-water mark for high-tier devices (bytes).
    pub memory_high_water_high: u64,
}

impl Default for ControllerTuning {
    /// Thresholds for a 60 fps target.
    fn default() -> Self {
        Self::for_target_fps(60.0)
    }
}

impl ControllerTuning {
    /// Tuning with fps thresholds scaled proportionally to a frame-rate
    /// target.
    ///
    /// At 60 fps this yields degrade below 45, severe below 25, and
    /// upgrade at or above 55; other targets keep the same ratios.
    /// Dwells and high-water marks are target-independent.
    pub fn for_target_fps(target_fps: f64) -> Self {
        Self {
            degrade_fps: target_fps * 45.0 / 60.0,
            severe_degrade_fps: target_fps * 25.0 / 60.0,
            upgrade_fps: target_fps * 55.0 / 60.0,
            downgrade_dwell: Duration::from_secs(2),
            severe_dwell: Duration::from_secs(1),
            upgrade_dwell: Duration::from_secs(5),
            memory_high_water_low: 768 * 1024 * 1024,
            memory_high_water_medium: 1536 * 1024 * 1024,
            memory_high_water_high: 3 * 1024 * 1024 * 1024,
        }
    }

    /// Memory high-water mark for the given tier.
    ///
    /// A single memory reading above this forces quality level 1
    /// immediately, overriding fps-based reasoning and dwell times.
    pub fn memory_high_water(&self, tier: CapabilityTier) -> u64 {
        match tier {
            CapabilityTier::Low => self.memory_high_water_low,
            CapabilityTier::Medium => self.memory_high_water_medium,
            CapabilityTier::High => self.memory_high_water_high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_asymmetric() {
        let tuning = ControllerTuning::default();
        // Upgrading requires a wider margin than degrading.
        assert!(tuning.upgrade_fps > tuning.degrade_fps);
        // And a longer dwell.
        assert!(tuning.upgrade_dwell > tuning.downgrade_dwell);
        assert!(tuning.severe_dwell < tuning.downgrade_dwell);
        // Severe threshold sits below the moderate one.
        assert!(tuning.severe_degrade_fps < tuning.degrade_fps);
    }

    #[test]
    fn test_thresholds_scale_with_target() {
        let tuning = ControllerTuning::for_target_fps(60.0);
        assert_eq!(tuning.degrade_fps, 45.0);
        assert_eq!(tuning.severe_degrade_fps, 25.0);
        assert_eq!(tuning.upgrade_fps, 55.0);

        // Half the target halves every threshold; the asymmetry holds.
        let tuning = ControllerTuning::for_target_fps(30.0);
        assert_eq!(tuning.degrade_fps, 22.5);
        assert_eq!(tuning.severe_degrade_fps, 12.5);
        assert_eq!(tuning.upgrade_fps, 27.5);
        assert!(tuning.upgrade_fps > tuning.degrade_fps);
    }

    #[test]
    fn test_high_water_marks_scale_with_tier() {
        let tuning = ControllerTuning::default();
        assert!(
            tuning.memory_high_water(CapabilityTier::Low)
                < tuning.memory_high_water(CapabilityTier::Medium)
        );
        assert!(
            tuning.memory_high_water(CapabilityTier::Medium)
                < tuning.memory_high_water(CapabilityTier::High)
        );
    }
}
