//! Configuration for the poller.
//!
//! [`PollerConfig`] controls the timing of the cycle loop and the capacity
//! of the event channel. Unset fields take the documented defaults; the
//! builder validates the whole configuration when the poller is built.

use std::time::Duration;

use crate::error::PollerError;

/// Timing and channel configuration for a [`Poller`].
///
/// [`Poller`]: crate::poller::Poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between the end of one cycle's evaluation and the next invocation.
    /// Default: 1 second
    pub delay: Duration,

    /// Delay before the first invocation.
    /// Default: zero
    pub initial_delay: Duration,

    /// Maximum number of re-scheduled cycles; `Some(n)` allows n + 1
    /// invocations in total, `None` polls until stopped.
    /// Default: `None`
    pub retry_limit: Option<u32>,

    /// Capacity of the broadcast event channel. Subscribers that fall more
    /// than this many events behind drop the oldest ones.
    /// Default: 100
    pub event_buffer_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            initial_delay: Duration::ZERO,
            retry_limit: None,
            event_buffer_size: 100,
        }
    }
}

impl PollerConfig {
    /// Create a new PollerConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a PollerConfig with zero delays.
    ///
    /// Cycles run back to back, so this only makes sense together with a
    /// stop condition or a retry limit.
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            initial_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PollerError> {
        if self.event_buffer_size == 0 {
            return Err(PollerError::Configuration(
                "event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Set the inter-cycle delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the delay before the first cycle.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Bound the number of cycles; `limit` re-schedules allow limit + 1
    /// invocations in total.
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = Some(limit);
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }
}
