//! Subscriber side of the poller's event channel.
//!
//! An [`EventStream`] is handed out by `Poller::subscribe()`. It supports
//! awaited, non-blocking, and timeout-bounded receives, and can be turned
//! into a `futures::Stream` for combinator-style consumption.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::warn;

use crate::event::PollEvent;
use crate::poller::PollerId;

/// A subscription to a poller's events.
///
/// Each stream independently observes every event emitted after it was
/// created, in emission order. A subscriber that falls more than the
/// configured event buffer behind loses the oldest events and resumes from
/// the earliest one still buffered.
pub struct EventStream<T> {
    id: PollerId,
    rx: broadcast::Receiver<PollEvent<T>>,
}

impl<T> EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(id: PollerId, rx: broadcast::Receiver<PollEvent<T>>) -> Self {
        Self { id, rx }
    }

    /// Await the next event.
    ///
    /// Returns `None` once the poller and its cycle loop are gone and all
    /// buffered events have been consumed.
    pub async fn recv(&mut self) -> Option<PollEvent<T>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(poller_id = %self.id, skipped, "event subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive an event without waiting.
    ///
    /// Returns `None` if no event is currently buffered or the channel is
    /// closed.
    pub fn try_recv(&mut self) -> Option<PollEvent<T>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(poller_id = %self.id, skipped, "event subscriber lagged; events dropped");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Await the next event for at most `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<PollEvent<T>> {
        tokio::time::timeout(timeout, self.recv()).await.ok().flatten()
    }

    /// Convert into a `futures::Stream` of events.
    pub fn into_stream(self) -> impl futures::Stream<Item = PollEvent<T>> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.recv().await.map(|event| (event, stream))
        })
    }
}
