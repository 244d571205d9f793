//! Application bootstrap and lifecycle management.
//!
//! This module provides `FramewardenApp`, the single owned instance of
//! the adaptive performance subsystem for a session. It replaces the
//! ambient-singleton pattern with explicit lifecycle: `start` at
//! bootstrap wires every component, `shutdown` at teardown releases
//! subscriptions and stops background probes.
//!
//! # Startup Sequence
//!
//! 1. Classify the device (host probe, or an explicit signal override)
//! 2. Create the session clock and telemetry hub
//! 3. Create the controller seeded from the tier and attach it to the hub
//! 4. Create the config publisher, interaction timer, and frame clock
//! 5. Optionally spawn the memory probe on the current Tokio runtime
//!
//! # Example
//!
//! ```ignore
//! use framewarden::app::{AppConfig, FramewardenApp};
//!
//! let app = FramewardenApp::start(AppConfig::default())?;
//!
//! // Hand the pieces to collaborators:
//! let publisher = app.config_publisher(); // visual components
//! let timer = app.interaction_timer();    // UI interaction brackets
//! let frames = app.frame_clock();         // render loop
//!
//! app.shutdown();
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::FramewardenApp;
pub use config::AppConfig;
pub use error::AppError;
