//! Builder for creating and configuring a [`Poller`].
//!
//! The builder provides a fluent API for supplying the work unit (a
//! closure or a [`PollTask`] implementation), an optional stop condition,
//! and timing configuration. All validation happens in `build()`; the
//! returned poller is inert until `start()` is called.
//!
//! # Example
//!
//! ```rust,ignore
//! use repoll::{PollerBuilder, PollerConfig};
//! use std::time::Duration;
//!
//! let poller = PollerBuilder::new()
//!     .work(|| async { Ok(fetch_progress().await?) })
//!     .stop_when(|progress: &u8| *progress >= 100)
//!     .config(PollerConfig::default().with_delay(Duration::from_millis(250)))
//!     .build()?;
//!
//! poller.start();
//! ```
//!
//! [`Poller`]: crate::poller::Poller
//! [`PollTask`]: crate::task::PollTask

use std::future::Future;

use crate::config::PollerConfig;
use crate::error::{PollerError, Result};
use crate::poller::Poller;
use crate::task::{BoxStopFn, BoxWorkFn, FnTask, PollTask, WorkResult};

/// Builder for [`Poller`] instances.
///
/// Exactly one work source must be supplied: either `.work()` (optionally
/// with `.stop_when()`) or `.task()`. Everything else has defaults.
///
/// [`Poller`]: crate::poller::Poller
pub struct PollerBuilder<T> {
    task: Option<Box<dyn PollTask<Output = T>>>,
    work: Option<BoxWorkFn<T>>,
    stop_when: Option<BoxStopFn<T>>,
    config: PollerConfig,
}

impl<T> PollerBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            task: None,
            work: None,
            stop_when: None,
            config: PollerConfig::default(),
        }
    }

    /// Supply the work as an async closure.
    ///
    /// The closure is called once per cycle. State the work needs across
    /// cycles lives in its captures.
    pub fn work<W, F>(mut self, mut work: W) -> Self
    where
        W: FnMut() -> F + Send + 'static,
        F: Future<Output = WorkResult<T>> + Send + 'static,
    {
        self.work = Some(Box::new(move || Box::pin(work())));
        self
    }

    /// Supply a stop condition for closure work.
    ///
    /// Evaluated against each cycle's result; polling stops on the first
    /// cycle for which it returns `true`. Without one, polling runs until
    /// the retry limit is exhausted or `stop()` is called.
    pub fn stop_when<C>(mut self, condition: C) -> Self
    where
        C: FnMut(&T) -> bool + Send + 'static,
    {
        self.stop_when = Some(Box::new(condition));
        self
    }

    /// Supply the work as a [`PollTask`] implementation.
    ///
    /// The task carries its own state and completion check; combining this
    /// with `.stop_when()` is rejected at build time.
    ///
    /// [`PollTask`]: crate::task::PollTask
    pub fn task<P>(mut self, task: P) -> Self
    where
        P: PollTask<Output = T> + 'static,
    {
        self.task = Some(Box::new(task));
        self
    }

    /// Replace the timing configuration.
    pub fn config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the inputs and build the poller.
    ///
    /// # Errors
    ///
    /// - [`PollerError::MissingWork`] if neither `.work()` nor `.task()`
    ///   was called.
    /// - [`PollerError::Configuration`] if both work sources were supplied,
    ///   if `.stop_when()` was combined with `.task()`, or if the
    ///   configuration is invalid.
    pub fn build(self) -> Result<Poller<T>> {
        self.config.validate()?;

        let task: Box<dyn PollTask<Output = T>> = match (self.task, self.work) {
            (Some(_), Some(_)) => {
                return Err(PollerError::Configuration(
                    "supply either a task or a work closure, not both".to_string(),
                ));
            }
            (Some(task), None) => {
                if self.stop_when.is_some() {
                    return Err(PollerError::Configuration(
                        "stop_when only applies to closure work; implement PollTask::is_complete instead"
                            .to_string(),
                    ));
                }
                task
            }
            (None, Some(work)) => Box::new(FnTask {
                work,
                stop_when: self.stop_when,
            }),
            (None, None) => return Err(PollerError::MissingWork),
        };

        Ok(Poller::new(task, self.config))
    }
}

impl<T> Default for PollerBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PollStatus;
    use crate::task::WorkResult;
    use async_trait::async_trait;

    struct NoopTask;

    #[async_trait]
    impl PollTask for NoopTask {
        type Output = u32;

        async fn run(&mut self) -> WorkResult<u32> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn build_without_work_fails() {
        let result = PollerBuilder::<u32>::new().build();
        assert!(matches!(result, Err(PollerError::MissingWork)));
    }

    #[tokio::test]
    async fn build_with_closure_work() {
        let poller = PollerBuilder::new()
            .work(|| async { Ok(1u32) })
            .build()
            .unwrap();

        assert_eq!(poller.status(), PollStatus::NotStarted);
        assert_eq!(poller.last_result(), None);
    }

    #[tokio::test]
    async fn build_with_task() {
        let poller = PollerBuilder::new().task(NoopTask).build().unwrap();
        assert_eq!(poller.status(), PollStatus::NotStarted);
    }

    #[tokio::test]
    async fn task_and_work_conflict() {
        let result = PollerBuilder::new()
            .task(NoopTask)
            .work(|| async { Ok(1u32) })
            .build();

        assert!(matches!(result, Err(PollerError::Configuration(_))));
    }

    #[tokio::test]
    async fn task_and_stop_when_conflict() {
        let result = PollerBuilder::new()
            .task(NoopTask)
            .stop_when(|n: &u32| *n > 3)
            .build();

        assert!(matches!(result, Err(PollerError::Configuration(_))));
    }

    #[tokio::test]
    async fn invalid_config_rejected() {
        let result = PollerBuilder::new()
            .work(|| async { Ok(1u32) })
            .config(PollerConfig::default().with_event_buffer_size(0))
            .build();

        assert!(matches!(result, Err(PollerError::Configuration(_))));
    }
}
