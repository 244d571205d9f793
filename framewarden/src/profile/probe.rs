//! Signal sources for device profiling.
//!
//! The `SignalSource` trait abstracts where static device signals come
//! from, so the application layer can swap the real host probe for a
//! fixed source in tests (the same seam pattern as the telemetry
//! producers).

use sysinfo::System;

use super::signals::{DeviceSignals, NetworkClass, PointerClass};

/// Source of static device signals.
///
/// # Implementors
///
/// - `HostProbe` - reads processor and memory signals from the host
/// - `FixedSignals` - testing: returns a fixed set of signals
pub trait SignalSource: Send + Sync {
    /// Read the current device signals.
    ///
    /// Must not fail: signals the source cannot determine are left
    /// unset and classification substitutes conservative defaults.
    fn signals(&self) -> DeviceSignals;
}

/// Reads device signals from the host via `sysinfo`.
///
/// Network class and pointer type are not host-probeable from here and
/// remain `Unknown` unless the embedding application supplies them
/// through an explicit override.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl HostProbe {
    /// Create a new host probe.
    pub fn new() -> Self {
        Self
    }
}

impl SignalSource for HostProbe {
    fn signals(&self) -> DeviceSignals {
        let mut system = System::new();
        system.refresh_cpu_list(sysinfo::CpuRefreshKind::nothing());
        system.refresh_memory();

        let processors = match system.cpus().len() {
            0 => None,
            n => Some(n as u32),
        };

        let total_bytes = system.total_memory();
        let memory_gib = if total_bytes == 0 {
            None
        } else {
            Some(total_bytes as f64 / (1024.0 * 1024.0 * 1024.0))
        };

        DeviceSignals {
            processors,
            memory_gib,
            network: NetworkClass::Unknown,
            pointer: PointerClass::Unknown,
        }
    }
}

/// Testing source that returns a fixed set of signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSignals(pub DeviceSignals);

impl SignalSource for FixedSignals {
    fn signals(&self) -> DeviceSignals {
        self.0
    }
}
