//! Monotonic session clock shared by all sample producers.
//!
//! Every producer stamps its samples from the same `SessionClock` so the
//! validator's per-stream monotonicity check compares like with like. The
//! clock reports milliseconds since session start as `f64`, matching the
//! open sample shape accepted at the public boundary.

use std::time::Instant;

/// Monotonic clock anchored at session start.
///
/// Readings are milliseconds elapsed since the anchor. The clock is cheap
/// to share (`Clone` copies the anchor) and never goes backwards.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    anchor: Instant,
}

impl SessionClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }

    /// Create a clock anchored at a specific instant (for testing).
    pub fn anchored_at(anchor: Instant) -> Self {
        Self { anchor }
    }

    /// Milliseconds elapsed since session start.
    pub fn now_ms(&self) -> f64 {
        self.anchor.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
