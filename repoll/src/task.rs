//! The work-unit seam.
//!
//! A poller invokes a [`PollTask`] once per cycle. Implement the trait
//! directly when the work carries its own state (connection handles,
//! attempt counters, request parameters); the builder's closure API wraps
//! plain async functions into a task behind the scenes.
//!
//! # Thread Safety
//!
//! Tasks move into the poller's spawned cycle loop, so they must be
//! `Send`. They are never shared between tasks; `&mut self` access is
//! exclusive to the loop.
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use repoll::{PollTask, WorkResult};
//!
//! struct JobStatusProbe {
//!     job_id: String,
//!     client: HttpClient,
//! }
//!
//! #[async_trait::async_trait]
//! impl PollTask for JobStatusProbe {
//!     type Output = JobStatus;
//!
//!     async fn run(&mut self) -> WorkResult<JobStatus> {
//!         Ok(self.client.fetch_status(&self.job_id).await?)
//!     }
//!
//!     async fn is_complete(&mut self, status: &JobStatus) -> WorkResult<bool> {
//!         Ok(status.finished())
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

/// Error type produced by a task's work or stop condition.
pub type WorkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for task operations.
pub type WorkResult<T> = std::result::Result<T, WorkError>;

/// A unit of work invoked once per poll cycle.
///
/// The task owns whatever state the work needs; the poller only ever holds
/// it as a trait object. An `Err` from either method stops the poller and
/// is reported as a `Failed` event.
#[async_trait]
pub trait PollTask: Send {
    /// The result produced by each cycle.
    type Output: Clone + Send + Sync + 'static;

    /// Run one cycle of work.
    async fn run(&mut self) -> WorkResult<Self::Output>;

    /// Decide whether polling should stop after this cycle's result.
    ///
    /// The default never stops; the poller then runs until its retry limit
    /// is exhausted or `stop()` is called.
    async fn is_complete(&mut self, _result: &Self::Output) -> WorkResult<bool> {
        Ok(false)
    }
}

/// Boxed future returned by a work closure.
pub(crate) type BoxWorkFuture<T> = Pin<Box<dyn Future<Output = WorkResult<T>> + Send>>;

/// Boxed work closure, as stored by the builder.
pub(crate) type BoxWorkFn<T> = Box<dyn FnMut() -> BoxWorkFuture<T> + Send>;

/// Boxed stop-condition closure, as stored by the builder.
pub(crate) type BoxStopFn<T> = Box<dyn FnMut(&T) -> bool + Send>;

/// Adapts the builder's closure pair into a [`PollTask`].
pub(crate) struct FnTask<T> {
    pub(crate) work: BoxWorkFn<T>,
    pub(crate) stop_when: Option<BoxStopFn<T>>,
}

#[async_trait]
impl<T> PollTask for FnTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    async fn run(&mut self) -> WorkResult<T> {
        (self.work)().await
    }

    async fn is_complete(&mut self, result: &T) -> WorkResult<bool> {
        match self.stop_when.as_mut() {
            Some(condition) => Ok(condition(result)),
            None => Ok(false),
        }
    }
}
