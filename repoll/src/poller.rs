//! The poller state machine and its cycle loop.
//!
//! A [`Poller`] wraps a deferred, repeating invocation of a work unit.
//! `start()` spawns a single cycle loop onto the Tokio runtime; the loop is
//! the only place work executes, so cycles never overlap. `stop()` is a
//! cooperative cancel: it wakes a pending inter-cycle sleep but lets an
//! in-flight cycle finish and report its result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PollerConfig;
use crate::event::{PollEvent, PollStatus};
use crate::stream::EventStream;
use crate::task::{PollTask, WorkError};

/// Unique identifier for a poller instance, carried in tracing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PollerId(Uuid);

impl PollerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PollerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling state of the poller.
///
/// The public status is derived from this and nothing else; every mutation
/// is followed by republishing the derived status on the watch channel.
#[derive(Debug)]
enum TimerState {
    /// Nothing scheduled yet.
    NotStarted,
    /// The cycle loop is scheduled or executing; holds the loop task handle.
    Active(AbortHandle),
    /// Terminated. There is no way back to `Active`.
    Stopped,
}

impl TimerState {
    fn status(&self) -> PollStatus {
        match self {
            TimerState::NotStarted => PollStatus::NotStarted,
            TimerState::Active(_) => PollStatus::InProgress,
            TimerState::Stopped => PollStatus::Stopped,
        }
    }
}

/// Point-in-time snapshot of a poller.
#[derive(Debug, Clone, Serialize)]
pub struct PollerStats {
    /// The poller's identity.
    pub id: PollerId,
    /// Current derived status.
    pub status: PollStatus,
    /// Number of completed cycles.
    pub cycles: u64,
    /// When `start()` was called, if it has been.
    pub started_at: Option<DateTime<Utc>>,
    /// Whether the cycle loop task is still running.
    pub is_running: bool,
}

struct State<T> {
    timer: TimerState,
    last_result: Option<T>,
    cycles: u64,
    started_at: Option<DateTime<Utc>>,
}

struct Shared<T> {
    id: PollerId,
    state: Mutex<State<T>>,
    status_tx: watch::Sender<PollStatus>,
    event_tx: broadcast::Sender<PollEvent<T>>,
}

impl<T: Clone> Shared<T> {
    /// Republish the derived status after a timer-state change.
    fn publish_status(&self, status: PollStatus) {
        self.status_tx.send_replace(status);
    }

    fn emit(&self, event: PollEvent<T>) {
        if self.event_tx.send(event).is_err() {
            debug!(poller_id = %self.id, "no event subscribers; event dropped");
        }
    }
}

/// A recurring-task poller.
///
/// Built via [`PollerBuilder`]; inert until [`start()`] is called. Once
/// stopped, for any reason, the poller stays stopped: build a fresh one to
/// poll again.
///
/// Dropping the handle does not cancel polling; the cycle loop keeps
/// running until it terminates on its own. Call [`stop()`] first if that
/// is not what you want.
///
/// [`PollerBuilder`]: crate::builder::PollerBuilder
/// [`start()`]: Poller::start
/// [`stop()`]: Poller::stop
pub struct Poller<T> {
    shared: Arc<Shared<T>>,
    task: Mutex<Option<Box<dyn PollTask<Output = T>>>>,
    config: PollerConfig,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(task: Box<dyn PollTask<Output = T>>, config: PollerConfig) -> Self {
        let (status_tx, _) = watch::channel(PollStatus::NotStarted);
        let (event_tx, _) = broadcast::channel(config.event_buffer_size);

        Self {
            shared: Arc::new(Shared {
                id: PollerId::new(),
                state: Mutex::new(State {
                    timer: TimerState::NotStarted,
                    last_result: None,
                    cycles: 0,
                    started_at: None,
                }),
                status_tx,
                event_tx,
            }),
            task: Mutex::new(Some(task)),
            config,
        }
    }

    /// Begin the repeating cycle.
    ///
    /// Spawns the cycle loop onto the current Tokio runtime; the first
    /// invocation runs after `initial_delay`. The status is `InProgress`
    /// as soon as this returns. Calling `start()` on a poller that was
    /// already started is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) {
        let Some(task) = self.task.lock().take() else {
            warn!(poller_id = %self.shared.id, "start() ignored; poller was already started");
            return;
        };

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        // Hold the state lock across the spawn so the loop's first guard
        // check cannot observe the pre-start timer state.
        let status = {
            let mut state = self.shared.state.lock();
            let handle = tokio::spawn(run_cycles(task, shared, config));
            state.timer = TimerState::Active(handle.abort_handle());
            state.started_at = Some(Utc::now());
            state.timer.status()
        };
        self.shared.publish_status(status);

        info!(
            poller_id = %self.shared.id,
            delay = ?self.config.delay,
            initial_delay = ?self.config.initial_delay,
            retry_limit = ?self.config.retry_limit,
            "poller started"
        );
    }

    /// Cancel polling.
    ///
    /// Only meaningful while the poller is active: cancels the pending
    /// timer, transitions to `Stopped`, and emits one `End` event carrying
    /// the current last result. An in-flight cycle is not aborted; it
    /// completes and emits its own `Poll` event. Calling `stop()` before
    /// `start()` or after the poller has stopped is a safe no-op that
    /// emits nothing.
    pub fn stop(&self) {
        let ended = {
            let mut state = self.shared.state.lock();
            match state.timer {
                TimerState::Active(_) => {
                    state.timer = TimerState::Stopped;
                    Some((state.last_result.clone(), state.timer.status()))
                }
                _ => None,
            }
        };

        let Some((last_result, status)) = ended else {
            debug!(poller_id = %self.shared.id, "stop() ignored; poller is not active");
            return;
        };

        // Publishing the terminal status wakes any pending inter-cycle sleep.
        self.shared.publish_status(status);
        self.shared.emit(PollEvent::End { last_result, status });

        info!(poller_id = %self.shared.id, "poller stopped");
    }

    /// The poller's identity.
    pub fn id(&self) -> PollerId {
        self.shared.id
    }

    /// Current status snapshot.
    ///
    /// Not guaranteed to be consistent with a cycle that is mid-flight.
    pub fn status(&self) -> PollStatus {
        *self.shared.status_tx.borrow()
    }

    /// The most recent cycle result, if any cycle has completed.
    pub fn last_result(&self) -> Option<T> {
        self.shared.state.lock().last_result.clone()
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.shared.state.lock().cycles
    }

    /// Point-in-time snapshot of the poller.
    pub fn stats(&self) -> PollerStats {
        let state = self.shared.state.lock();
        PollerStats {
            id: self.shared.id,
            status: state.timer.status(),
            cycles: state.cycles,
            started_at: state.started_at,
            is_running: matches!(&state.timer, TimerState::Active(h) if !h.is_finished()),
        }
    }

    /// Subscribe to the event stream.
    ///
    /// Each subscriber independently sees every event emitted after it
    /// subscribed, in emission order.
    pub fn subscribe(&self) -> EventStream<T> {
        EventStream::new(self.shared.id, self.shared.event_tx.subscribe())
    }

    /// Resolve once the poller reaches `Stopped`, however it gets there.
    pub async fn done(&self) {
        let mut status_rx = self.shared.status_tx.subscribe();
        let _ = status_rx.wait_for(|status| status.is_terminal()).await;
    }
}

impl<T> fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("id", &self.shared.id)
            .field("status", &*self.shared.status_tx.borrow())
            .finish_non_exhaustive()
    }
}

/// The cycle loop. Owns the work unit for the poller's whole lifetime.
async fn run_cycles<T>(
    mut task: Box<dyn PollTask<Output = T>>,
    shared: Arc<Shared<T>>,
    config: PollerConfig,
) where
    T: Clone + Send + Sync + 'static,
{
    wait_for_timer(&shared, config.initial_delay).await;

    loop {
        // Guard against the race where stop() landed between scheduling
        // this cycle and it firing.
        if matches!(shared.state.lock().timer, TimerState::Stopped) {
            debug!(poller_id = %shared.id, "timer fired after stop; skipping cycle");
            return;
        }

        let result = match task.run().await {
            Ok(result) => result,
            Err(e) => return fail_cycle(&shared, e),
        };

        let complete = match task.is_complete(&result).await {
            Ok(complete) => complete,
            Err(e) => return fail_cycle(&shared, e),
        };

        let (cycle, status, finishing) = {
            let mut state = shared.state.lock();
            state.cycles += 1;

            // Count before comparing, so Some(n) yields exactly n + 1
            // invocations.
            let exhausted = config
                .retry_limit
                .is_some_and(|limit| state.cycles > u64::from(limit));
            let cancelled = matches!(state.timer, TimerState::Stopped);
            let finishing = complete || exhausted || cancelled;

            if finishing && !cancelled {
                state.timer = TimerState::Stopped;
            }
            state.last_result = Some(result.clone());

            (state.cycles, state.timer.status(), finishing)
        };
        shared.publish_status(status);

        debug!(poller_id = %shared.id, cycle, %status, "cycle completed");
        shared.emit(PollEvent::Poll { result, status });

        if finishing {
            info!(poller_id = %shared.id, cycle, "polling finished");
            return;
        }

        wait_for_timer(&shared, config.delay).await;
    }
}

/// Contain a cycle failure: stop the poller and report it on the stream.
///
/// The error never escapes the loop task; an uncaught failure here would
/// silently kill all future cycles with no notification to the caller.
fn fail_cycle<T: Clone>(shared: &Shared<T>, error: WorkError) {
    let (cycle, status) = {
        let mut state = shared.state.lock();
        if !matches!(state.timer, TimerState::Stopped) {
            state.timer = TimerState::Stopped;
        }
        (state.cycles + 1, state.timer.status())
    };
    shared.publish_status(status);

    error!(poller_id = %shared.id, cycle, error = %error, "cycle failed; polling stopped");
    shared.emit(PollEvent::Failed {
        cycle,
        message: error.to_string(),
        status,
    });
}

/// Sleep until the next cycle is due, or until the poller stops.
///
/// Watch-channel semantics mean a stop() landing before the sleep is
/// polled still wakes it; the loop's guard makes the final call either way.
async fn wait_for_timer<T>(shared: &Shared<T>, delay: Duration) {
    if delay.is_zero() {
        return;
    }

    let mut status_rx = shared.status_tx.subscribe();
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = status_rx.wait_for(|status| status.is_terminal()) => {
            debug!(poller_id = %shared.id, "pending timer cancelled");
        }
    }
}
