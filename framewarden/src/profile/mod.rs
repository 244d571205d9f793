//! Device capability profiling.
//!
//! This module classifies the host device into a coarse capability tier
//! using static signals available at startup: logical processor count,
//! approximate device memory, network class, and primary pointer type.
//! The tier seeds the initial rendering-quality configuration before any
//! live telemetry arrives.
//!
//! # Classification Policy
//!
//! Evaluated in precedence order, first match wins:
//!
//! ```text
//! Low:    processors ≤ 2  OR  memory ≤ 2 GiB  OR  network ≤ 2G
//!         OR (coarse pointer AND processors ≤ 4 AND memory ≤ 4 GiB)
//! High:   processors ≥ 8  AND  memory ≥ 8 GiB  AND  fast network
//! Medium: otherwise
//! ```
//!
//! Classification is a pure function with no error conditions: missing
//! signals default to conservative mid-range values, so it never fails.
//! It is intended to run exactly once per session; the application layer
//! caches the result.

mod probe;
mod signals;

pub use probe::{FixedSignals, HostProbe, SignalSource};
pub use signals::{classify, CapabilityTier, DeviceSignals, NetworkClass, PointerClass};
