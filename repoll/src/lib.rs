//! # repoll
//!
//! A recurring-task poller for Tokio with lifecycle control and an
//! observable event stream.
//!
//! ## Overview
//!
//! A [`Poller`] repeatedly invokes a caller-supplied async unit of work on
//! a fixed delay until a stop condition holds, a retry limit is exhausted,
//! a cycle fails, or the caller stops it. Every cycle's outcome and every
//! status transition is reported on a broadcast event stream that any
//! number of subscribers can observe independently.
//!
//! ## Key Features
//!
//! - **Single-Flight Cycles**: at most one invocation is ever in flight;
//!   the next cycle is scheduled only after the current one fully resolves
//! - **Derived Status**: `not_started` / `in_progress` / `stopped` is a
//!   pure function of the internal timer state, never set directly
//! - **Cooperative Cancel**: `stop()` wakes a pending timer but lets an
//!   in-flight cycle finish and report its result
//! - **Contained Failures**: an error in the work or the stop condition
//!   stops the poller and surfaces as a `Failed` event instead of killing
//!   the scheduling task silently
//! - **Observable Surface**: subscribe to events, or snapshot `status()`,
//!   `last_result()`, and `stats()` at any time
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repoll::{PollerBuilder, PollerConfig, PollEvent};
//! use std::time::Duration;
//!
//! let poller = PollerBuilder::new()
//!     .work(|| async { Ok(check_job_status().await?) })
//!     .stop_when(|status: &JobStatus| status.finished())
//!     .config(PollerConfig::default().with_delay(Duration::from_secs(2)))
//!     .build()?;
//!
//! let mut events = poller.subscribe();
//! poller.start();
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         PollEvent::Poll { result, status } => {
//!             println!("{status}: {result:?}");
//!             if status.is_terminal() {
//!                 break;
//!             }
//!         }
//!         PollEvent::End { .. } | PollEvent::Failed { .. } => break,
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! `start()` spawns a single cycle loop that owns the work unit:
//!
//! 1. **Guard**: a cycle firing after `stop()` is a no-op
//! 2. **Run**: await the work, then await the stop condition
//! 3. **Resolve**: update the timer state (stop condition met, retry limit
//!    exceeded, or cancelled mid-flight), republish the derived status
//! 4. **Report**: record the result and emit a `Poll` event, including on
//!    the terminating cycle
//!
//! `End` events fire only on an explicit `stop()`; automatic termination
//! is reported by the final `Poll` or `Failed` event, and [`Poller::done`]
//! resolves on any of them.

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod poller;
pub mod stream;
pub mod task;

// Re-export main types for convenience
pub use builder::PollerBuilder;
pub use config::PollerConfig;
pub use error::{PollerError, Result};
pub use event::{PollEvent, PollStatus};
pub use poller::{Poller, PollerId, PollerStats};
pub use stream::EventStream;
pub use task::{PollTask, WorkError, WorkResult};

/// Prelude module for convenient imports
///
/// ```rust
/// use repoll::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        EventStream, PollEvent, PollStatus, PollTask, Poller, PollerBuilder, PollerConfig,
        PollerError, PollerId, PollerStats, WorkError, WorkResult,
    };
}
