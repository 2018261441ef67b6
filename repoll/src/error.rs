//! Error types for the repoll crate.
//!
//! Only construction can fail with a [`PollerError`]. Failures inside a
//! running cycle never surface as errors: the cycle loop catches them,
//! stops the poller, and reports them as [`PollEvent::Failed`] on the
//! event stream, so a broken work function cannot take down the task it
//! is scheduled on.
//!
//! [`PollEvent::Failed`]: crate::event::PollEvent::Failed

use thiserror::Error;

/// Errors that can occur while building a poller.
#[derive(Debug, Clone, Error)]
pub enum PollerError {
    /// No work function or task was supplied to the builder.
    #[error("no work provided: a poller requires a work closure or a PollTask")]
    MissingWork,

    /// Invalid configuration or conflicting builder inputs.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type for poller construction.
pub type Result<T> = std::result::Result<T, PollerError>;
