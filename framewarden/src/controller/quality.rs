//! Quality configuration and its pure derivation from level and tier.

use serde::{Deserialize, Serialize};

use crate::profile::CapabilityTier;

/// Lowest permitted quality level.
pub const MIN_QUALITY_LEVEL: u8 = 1;

/// Highest permitted quality level.
pub const MAX_QUALITY_LEVEL: u8 = 5;

/// Rendering-quality configuration consumed by visual components.
///
/// Owned exclusively by the `AdaptiveController` and mutated at most
/// once per control-loop evaluation; consumers always receive a
/// wholesale-replaced snapshot, never in-place field updates.
///
/// Invariants:
/// - `quality_level` is always within `[1, 5]`
/// - `effects_enabled` is `false` whenever `quality_level < 2`
/// - `sampling_rate` is a pure function of the capability tier and is
///   never independently overridden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// How much rendering work is permitted per frame (1 = minimum).
    pub quality_level: u8,

    /// Whether expensive visual effects may run at all.
    pub effects_enabled: bool,

    /// Particle budget as a fraction of the full density.
    pub particle_density: f64,

    /// Cap on simultaneously running animations.
    pub max_concurrent_animations: u32,

    /// Fraction of telemetry-worthy events that should be sampled.
    pub sampling_rate: f64,
}

/// Baseline quality level for a capability tier, before any live
/// adjustment. High tier starts at 4, leaving headroom to earn level 5.
pub fn baseline_level(tier: CapabilityTier) -> u8 {
    match tier {
        CapabilityTier::Low => 1,
        CapabilityTier::Medium => 3,
        CapabilityTier::High => 4,
    }
}

/// Telemetry sampling rate for a capability tier.
///
/// Weaker devices sample fewer events so measurement overhead does not
/// itself become rendering pressure.
pub fn sampling_rate(tier: CapabilityTier) -> f64 {
    match tier {
        CapabilityTier::Low => 0.25,
        CapabilityTier::Medium => 0.5,
        CapabilityTier::High => 1.0,
    }
}

/// Derive the full configuration for a quality level on a tier.
///
/// Pure function; the level is clamped into `[1, 5]` first so every
/// config this produces satisfies the type's invariants.
pub fn derive_config(level: u8, tier: CapabilityTier) -> QualityConfig {
    let level = level.clamp(MIN_QUALITY_LEVEL, MAX_QUALITY_LEVEL);

    // Animation budget per level, scaled by tier.
    let base_animations: u32 = match level {
        1 => 0,
        2 => 2,
        3 => 4,
        4 => 8,
        _ => 12,
    };
    let max_concurrent_animations = match tier {
        CapabilityTier::Low => base_animations / 2,
        CapabilityTier::Medium => base_animations,
        CapabilityTier::High => base_animations + base_animations / 2,
    };

    QualityConfig {
        quality_level: level,
        effects_enabled: level >= 2,
        particle_density: f64::from(level - 1) / 4.0,
        max_concurrent_animations,
        sampling_rate: sampling_rate(tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(derive_config(0, CapabilityTier::Medium).quality_level, 1);
        assert_eq!(derive_config(9, CapabilityTier::Medium).quality_level, 5);
    }

    #[test]
    fn test_effects_disabled_below_level_two() {
        for tier in [
            CapabilityTier::Low,
            CapabilityTier::Medium,
            CapabilityTier::High,
        ] {
            for level in MIN_QUALITY_LEVEL..=MAX_QUALITY_LEVEL {
                let config = derive_config(level, tier);
                assert_eq!(config.effects_enabled, level >= 2);
                assert!((1..=5).contains(&config.quality_level));
            }
        }
    }

    #[test]
    fn test_particle_density_spans_unit_interval() {
        assert_eq!(derive_config(1, CapabilityTier::High).particle_density, 0.0);
        assert_eq!(derive_config(3, CapabilityTier::High).particle_density, 0.5);
        assert_eq!(derive_config(5, CapabilityTier::High).particle_density, 1.0);
    }

    #[test]
    fn test_sampling_rate_is_tier_function_only() {
        for level in MIN_QUALITY_LEVEL..=MAX_QUALITY_LEVEL {
            assert_eq!(derive_config(level, CapabilityTier::Low).sampling_rate, 0.25);
            assert_eq!(
                derive_config(level, CapabilityTier::Medium).sampling_rate,
                0.5
            );
            assert_eq!(derive_config(level, CapabilityTier::High).sampling_rate, 1.0);
        }
    }

    #[test]
    fn test_animation_budget_scales_with_tier() {
        let low = derive_config(4, CapabilityTier::Low).max_concurrent_animations;
        let medium = derive_config(4, CapabilityTier::Medium).max_concurrent_animations;
        let high = derive_config(4, CapabilityTier::High).max_concurrent_animations;
        assert!(low < medium && medium < high);
    }

    #[test]
    fn test_baseline_levels() {
        assert_eq!(baseline_level(CapabilityTier::Low), 1);
        assert_eq!(baseline_level(CapabilityTier::Medium), 3);
        assert_eq!(baseline_level(CapabilityTier::High), 4);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(
            derive_config(3, CapabilityTier::Medium),
            derive_config(3, CapabilityTier::Medium)
        );
    }
}
