//! Framewarden - adaptive rendering-quality control
//!
//! This library implements a closed-loop controller that keeps an interactive
//! application's visual fidelity matched to what the host device can actually
//! sustain. It classifies the device once at startup, continuously samples
//! live rendering and interaction performance, validates those samples, and
//! maintains a shared quality configuration that visual components read to
//! decide how much work to do per frame.
//!
//! # Architecture
//!
//! ```text
//! DeviceSignals ──► classify() ──► CapabilityTier ─────────────┐
//!                                                              ▼
//! Producers ──► TelemetryHub ──► AggregateMetrics ──► AdaptiveController
//! (FrameClock,   (validate +                          (hysteresis-bounded
//!  MemoryProbe,   fold + fan-out)                      level transitions)
//!  InteractionTimer)                                           │
//!                                                              ▼
//!                                       ConfigPublisher ──► QualityConfig
//!                                                            (consumers)
//! ```
//!
//! Configuration flows one direction (profiler → controller → publisher →
//! consumers) and telemetry flows the other (producers → hub → controller).
//!
//! # Example
//!
//! ```ignore
//! use framewarden::app::{FramewardenApp, AppConfig};
//!
//! let app = FramewardenApp::start(AppConfig::default())?;
//!
//! // Render loop reports frame timing
//! let frames = app.frame_clock();
//! frames.tick();
//!
//! // Visual components gate effects on the current config
//! let config = app.config_publisher().current();
//! if config.effects_enabled { /* draw particles */ }
//!
//! app.shutdown();
//! ```

pub mod app;
pub mod clock;
pub mod controller;
pub mod probes;
pub mod profile;
pub mod publisher;
pub mod sample;
pub mod telemetry;
pub mod timer;

pub use app::{AppConfig, AppError, FramewardenApp};
pub use clock::SessionClock;
pub use controller::{AdaptiveController, ControllerTuning, QualityConfig};
pub use profile::{classify, CapabilityTier, DeviceSignals, NetworkClass, PointerClass};
pub use publisher::ConfigPublisher;
pub use sample::{PerformanceSample, RawSample, RejectReason, SampleKind, SampleValidator};
pub use telemetry::{AggregateMetrics, InteractionStats, Subscription, TelemetryHub};
pub use timer::{InteractionTimer, StopHandle};
