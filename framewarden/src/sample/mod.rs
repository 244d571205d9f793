//! Performance sample types and boundary validation.
//!
//! Producers at the public boundary submit `RawSample` values with a
//! free-form `kind` string. The validator narrows that open shape into
//! the closed `PerformanceSample` variant before it can influence any
//! control decision, so downstream logic never deals with missing or
//! malformed fields.
//!
//! # Rejection Policy
//!
//! A raw sample is rejected when:
//! - the value is non-finite or negative
//! - the timestamp is non-finite
//! - the kind string is unrecognized
//! - the kind is `interaction` and no name is given
//! - the timestamp regresses relative to the last accepted timestamp
//!   for the same producer stream (clock-skew/replay guard)
//!
//! Rejection never panics and never propagates to the producer: the
//! hub drops the sample from control-affecting aggregates, counts it,
//! and logs it at debug level for diagnostics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw sample shape accepted at the public boundary.
///
/// Deliberately loose: `kind` is a free-form string and `name` is
/// optional. Validation narrows this into `PerformanceSample`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Sample kind: `"frame"`, `"interaction"`, or `"memory"`.
    pub kind: String,

    /// Interaction name; required when kind is `"interaction"`.
    pub name: Option<String>,

    /// Measured value: milliseconds for frame/interaction, bytes for memory.
    pub value: f64,

    /// Monotonic clock reading (milliseconds since session start).
    pub timestamp_ms: f64,
}

impl RawSample {
    /// Create a frame-time sample (value in milliseconds).
    pub fn frame(value_ms: f64, timestamp_ms: f64) -> Self {
        Self {
            kind: "frame".to_string(),
            name: None,
            value: value_ms,
            timestamp_ms,
        }
    }

    /// Create an interaction-duration sample (value in milliseconds).
    pub fn interaction(name: impl Into<String>, value_ms: f64, timestamp_ms: f64) -> Self {
        Self {
            kind: "interaction".to_string(),
            name: Some(name.into()),
            value: value_ms,
            timestamp_ms,
        }
    }

    /// Create a memory-usage sample (value in bytes).
    pub fn memory(value_bytes: f64, timestamp_ms: f64) -> Self {
        Self {
            kind: "memory".to_string(),
            name: None,
            value: value_bytes,
            timestamp_ms,
        }
    }
}

/// Closed sample discriminator used by all internal logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Frame render time (milliseconds).
    Frame,
    /// User interaction duration (milliseconds).
    Interaction,
    /// Memory usage (bytes).
    Memory,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleKind::Frame => write!(f, "frame"),
            SampleKind::Interaction => write!(f, "interaction"),
            SampleKind::Memory => write!(f, "memory"),
        }
    }
}

impl SampleKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "frame" => Some(SampleKind::Frame),
            "interaction" => Some(SampleKind::Interaction),
            "memory" => Some(SampleKind::Memory),
            _ => None,
        }
    }
}

/// A validated, immutable performance measurement.
///
/// Never mutated after creation; folded into aggregates and retained
/// only within the hub's bounded diagnostics window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSample {
    /// What was measured.
    pub kind: SampleKind,
    /// Interaction name (present iff kind is `Interaction`).
    pub name: Option<String>,
    /// Measured value (ms or bytes, by kind).
    pub value: f64,
    /// Monotonic clock reading (ms since session start).
    pub timestamp_ms: f64,
}

/// Why a raw sample was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    /// Value was NaN or infinite.
    #[error("sample value is not finite")]
    NonFiniteValue,

    /// Timestamp was NaN or infinite.
    #[error("sample timestamp is not finite")]
    NonFiniteTimestamp,

    /// Value was negative (durations and byte counts cannot be).
    #[error("sample value is negative: {0}")]
    NegativeValue(f64),

    /// Kind string did not match a known sample kind.
    #[error("unknown sample kind: {0:?}")]
    UnknownKind(String),

    /// Interaction sample without a name.
    #[error("interaction sample requires a name")]
    MissingName,

    /// Timestamp regressed relative to the stream's last accepted sample.
    #[error("timestamp {got}ms regresses behind last accepted {last}ms")]
    NonMonotonicTimestamp { got: f64, last: f64 },
}

/// Validates raw samples before they can influence control decisions.
///
/// Stateful only for the monotonicity guard: the validator remembers the
/// last accepted timestamp per producer stream. Streams are keyed by kind
/// (one stream each for frame and memory producers) and per interaction
/// name. Equal timestamps are accepted since producers share a coarse
/// millisecond clock; only regressions are rejected.
#[derive(Debug, Default)]
pub struct SampleValidator {
    last_accepted_ms: HashMap<String, f64>,
}

impl SampleValidator {
    /// Create a validator with no accepted history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a raw sample, narrowing it into a `PerformanceSample`.
    ///
    /// Never panics. On success the sample's timestamp becomes the new
    /// monotonicity floor for its stream.
    pub fn validate(&mut self, raw: &RawSample) -> Result<PerformanceSample, RejectReason> {
        if !raw.value.is_finite() {
            return Err(RejectReason::NonFiniteValue);
        }
        if !raw.timestamp_ms.is_finite() {
            return Err(RejectReason::NonFiniteTimestamp);
        }
        if raw.value < 0.0 {
            return Err(RejectReason::NegativeValue(raw.value));
        }

        let kind = SampleKind::parse(&raw.kind)
            .ok_or_else(|| RejectReason::UnknownKind(raw.kind.clone()))?;

        let name = match kind {
            SampleKind::Interaction => match &raw.name {
                Some(n) if !n.is_empty() => Some(n.clone()),
                _ => return Err(RejectReason::MissingName),
            },
            _ => None,
        };

        let stream = match &name {
            Some(n) => format!("interaction:{}", n),
            None => kind.to_string(),
        };

        if let Some(&last) = self.last_accepted_ms.get(&stream) {
            if raw.timestamp_ms < last {
                return Err(RejectReason::NonMonotonicTimestamp {
                    got: raw.timestamp_ms,
                    last,
                });
            }
        }
        self.last_accepted_ms.insert(stream, raw.timestamp_ms);

        Ok(PerformanceSample {
            kind,
            name,
            value: raw.value,
            timestamp_ms: raw.timestamp_ms,
        })
    }

    /// Forget all monotonicity state (used when an epoch is reset).
    pub fn reset(&mut self) {
        self.last_accepted_ms.clear();
    }
}
