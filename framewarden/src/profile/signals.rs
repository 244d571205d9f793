//! Static device signals and the tier classification function.

use serde::{Deserialize, Serialize};

/// Default processor count when the host does not report one.
const DEFAULT_PROCESSORS: u32 = 4;

/// Default device memory (GiB) when the host does not report one.
const DEFAULT_MEMORY_GIB: f64 = 4.0;

/// Coarse device capability classification.
///
/// Computed once at startup and immutable for the session. Seeds the
/// initial quality level and the tier-relative controller thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    /// Weak device: minimal rendering work, effects disabled by default.
    Low,
    /// Mid-range device: moderate effects budget.
    Medium,
    /// Strong device: full effects budget available.
    High,
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityTier::Low => write!(f, "low"),
            CapabilityTier::Medium => write!(f, "medium"),
            CapabilityTier::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for CapabilityTier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        })
    }
}

/// Effective network class reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkClass {
    /// Very slow connection (effective ≤ 2G).
    Slow2G,
    /// Slow connection (effective 2G).
    Regular2G,
    /// Moderate connection (effective 3G).
    ThreeG,
    /// Fast connection (effective 4G or better / unmetered).
    FourG,
    /// Host did not report a network class.
    #[default]
    Unknown,
}

impl NetworkClass {
    /// Whether this class counts as slow (≤ 2G) for classification.
    pub fn is_slow(&self) -> bool {
        matches!(self, NetworkClass::Slow2G | NetworkClass::Regular2G)
    }

    /// Whether this class counts as fast for the high-tier gate.
    ///
    /// Unknown is treated as fast: desktop hosts commonly omit the signal
    /// and penalizing them would misclassify strong machines.
    pub fn is_fast(&self) -> bool {
        matches!(self, NetworkClass::FourG | NetworkClass::Unknown)
    }
}

/// Primary pointer capability reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerClass {
    /// Precise pointer (mouse, trackpad).
    Fine,
    /// Coarse pointer (touch-primary).
    Coarse,
    /// Host did not report a pointer class.
    #[default]
    Unknown,
}

/// Static signals used for capability classification.
///
/// Any signal the host cannot report is `None` and substituted with a
/// conservative mid-range default, so classification never fails on
/// older hosts (the `ProfilingUnavailable` case degrades, not errors).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeviceSignals {
    /// Logical processor count.
    pub processors: Option<u32>,
    /// Approximate device memory in GiB.
    pub memory_gib: Option<f64>,
    /// Effective network class.
    pub network: NetworkClass,
    /// Primary pointer type.
    pub pointer: PointerClass,
}

impl DeviceSignals {
    fn processors_or_default(&self) -> u32 {
        self.processors.unwrap_or(DEFAULT_PROCESSORS)
    }

    fn memory_or_default(&self) -> f64 {
        self.memory_gib.unwrap_or(DEFAULT_MEMORY_GIB)
    }
}

/// Classify the host device into a capability tier.
///
/// Pure function of the static signals; see the module docs for the
/// precedence policy. Never panics and has no error conditions.
pub fn classify(signals: &DeviceSignals) -> CapabilityTier {
    let processors = signals.processors_or_default();
    let memory = signals.memory_or_default();

    let touch_constrained =
        signals.pointer == PointerClass::Coarse && processors <= 4 && memory <= 4.0;

    if processors <= 2 || memory <= 2.0 || signals.network.is_slow() || touch_constrained {
        return CapabilityTier::Low;
    }

    if processors >= 8 && memory >= 8.0 && signals.network.is_fast() {
        return CapabilityTier::High;
    }

    CapabilityTier::Medium
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(processors: u32, memory_gib: f64) -> DeviceSignals {
        DeviceSignals {
            processors: Some(processors),
            memory_gib: Some(memory_gib),
            network: NetworkClass::Unknown,
            pointer: PointerClass::Unknown,
        }
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(format!("{}", CapabilityTier::Low), "low");
        assert_eq!(format!("{}", CapabilityTier::Medium), "medium");
        assert_eq!(format!("{}", CapabilityTier::High), "high");
    }

    #[test]
    fn test_tier_parsing_is_forgiving() {
        assert_eq!("low".parse::<CapabilityTier>().unwrap(), CapabilityTier::Low);
        assert_eq!(
            "HIGH".parse::<CapabilityTier>().unwrap(),
            CapabilityTier::High
        );
        assert_eq!(
            "unknown".parse::<CapabilityTier>().unwrap(),
            CapabilityTier::Medium
        );
    }

    #[test]
    fn test_low_on_few_processors() {
        assert_eq!(classify(&signals(2, 16.0)), CapabilityTier::Low);
        assert_eq!(classify(&signals(1, 16.0)), CapabilityTier::Low);
    }

    #[test]
    fn test_low_on_small_memory() {
        assert_eq!(classify(&signals(16, 2.0)), CapabilityTier::Low);
        assert_eq!(classify(&signals(16, 1.0)), CapabilityTier::Low);
    }

    #[test]
    fn test_low_on_slow_network() {
        let mut s = signals(16, 16.0);
        s.network = NetworkClass::Regular2G;
        assert_eq!(classify(&s), CapabilityTier::Low);
        s.network = NetworkClass::Slow2G;
        assert_eq!(classify(&s), CapabilityTier::Low);
    }

    #[test]
    fn test_low_on_constrained_touch_device() {
        // Scenario from the control-loop contract: 2 CPUs, 4 GiB, 3G, touch.
        let s = DeviceSignals {
            processors: Some(2),
            memory_gib: Some(4.0),
            network: NetworkClass::ThreeG,
            pointer: PointerClass::Coarse,
        };
        assert_eq!(classify(&s), CapabilityTier::Low);

        // Touch alone with 4 CPUs / 4 GiB is still constrained.
        let s = DeviceSignals {
            processors: Some(4),
            memory_gib: Some(4.0),
            network: NetworkClass::FourG,
            pointer: PointerClass::Coarse,
        };
        assert_eq!(classify(&s), CapabilityTier::Low);
    }

    #[test]
    fn test_touch_with_strong_hardware_is_not_low() {
        let s = DeviceSignals {
            processors: Some(8),
            memory_gib: Some(8.0),
            network: NetworkClass::FourG,
            pointer: PointerClass::Coarse,
        };
        assert_eq!(classify(&s), CapabilityTier::High);
    }

    #[test]
    fn test_high_requires_all_signals_strong() {
        assert_eq!(classify(&signals(8, 8.0)), CapabilityTier::High);
        assert_eq!(classify(&signals(8, 6.0)), CapabilityTier::Medium);
        assert_eq!(classify(&signals(6, 8.0)), CapabilityTier::Medium);

        let mut s = signals(8, 8.0);
        s.network = NetworkClass::ThreeG;
        assert_eq!(classify(&s), CapabilityTier::Medium);
    }

    #[test]
    fn test_missing_signals_classify_as_medium() {
        // Conservative defaults: 4 processors, 4 GiB, unknown network.
        assert_eq!(classify(&DeviceSignals::default()), CapabilityTier::Medium);
    }

    #[test]
    fn test_low_precedence_beats_high() {
        // Slow network forces Low even on otherwise-strong hardware.
        let mut s = signals(16, 32.0);
        s.network = NetworkClass::Slow2G;
        assert_eq!(classify(&s), CapabilityTier::Low);
    }
}
