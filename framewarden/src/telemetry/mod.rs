//! Telemetry collection and fan-out.
//!
//! This module provides the `TelemetryHub`, the process-wide broadcaster
//! of performance samples. Producers push raw samples via `publish()`;
//! the hub validates them, folds accepted samples into `AggregateMetrics`,
//! and notifies subscribers with an updated snapshot.
//!
//! # Architecture
//!
//! ```text
//! Producers ──► publish(RawSample) ──► SampleValidator
//!                                            │ accepted
//!                                            ▼
//!                                     AggregateMetrics ──► subscribers
//!                                     (owned by the hub)   (snapshot copies)
//! ```
//!
//! # Delivery Guarantees
//!
//! - Synchronous, in registration order, within a single `publish` call
//! - A panicking subscriber never prevents delivery to later subscribers
//!   and never corrupts the aggregates
//! - Samples fold in publish order; aggregate counts are monotonically
//!   non-decreasing within an epoch
//! - Publish is fire-and-forget and O(1) amortized; only a bounded
//!   rolling window of recent samples is retained, for diagnostics

mod aggregate;
mod broadcaster;
mod hub;

pub use aggregate::{AggregateMetrics, InteractionStats};
pub use broadcaster::{Broadcaster, Subscription};
pub use hub::{TelemetryHub, DEFAULT_WINDOW_CAPACITY};
