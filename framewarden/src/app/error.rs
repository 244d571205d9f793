//! Application error types.

use thiserror::Error;

/// Errors that can occur during application lifecycle.
///
/// Nothing in the running control loop is fatal; these only cover
/// bootstrap misconfiguration. The worst runtime outcome is quality
/// staying at its last-known level instead of adapting further.
#[derive(Debug, Error)]
pub enum AppError {
    /// A background probe was requested but no Tokio runtime is active.
    #[error("memory probe requires a running Tokio runtime")]
    RuntimeUnavailable,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
