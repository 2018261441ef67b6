//! Status and event types for the poller.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a poller.
///
/// The status is derived purely from the poller's internal timer state and
/// is never written independently. `Stopped` is terminal: a stopped poller
/// cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    /// Built but not yet started.
    NotStarted,
    /// The cycle loop is scheduled or executing.
    InProgress,
    /// Terminated, by completion, exhaustion, failure, or `stop()`.
    Stopped,
}

impl PollStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollStatus::Stopped)
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PollStatus::NotStarted => "not_started",
            PollStatus::InProgress => "in_progress",
            PollStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Events emitted by a poller.
///
/// Every subscriber sees events in emission order. `End` fires only on an
/// explicit `stop()`; automatic termination (stop condition met, retries
/// exhausted, cycle failure) is reported through the final `Poll` or
/// `Failed` event instead.
#[derive(Debug, Clone)]
pub enum PollEvent<T> {
    /// A cycle completed, including the one that terminates polling.
    Poll {
        /// The result of this cycle's work.
        result: T,
        /// Poller status after the cycle was evaluated.
        status: PollStatus,
    },

    /// Polling was cancelled via `stop()`.
    End {
        /// The most recent result at the time of cancellation.
        last_result: Option<T>,
        /// Poller status after cancellation (always `Stopped`).
        status: PollStatus,
    },

    /// A cycle's work or stop condition failed; polling has stopped.
    Failed {
        /// The invocation number that failed, counting from 1.
        cycle: u64,
        /// Rendered error from the work unit.
        message: String,
        /// Poller status after the failure (always `Stopped`).
        status: PollStatus,
    },
}

impl<T> PollEvent<T> {
    /// The poller status carried by this event.
    pub fn status(&self) -> PollStatus {
        match self {
            PollEvent::Poll { status, .. } => *status,
            PollEvent::End { status, .. } => *status,
            PollEvent::Failed { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(PollStatus::NotStarted.to_string(), "not_started");
        assert_eq!(PollStatus::InProgress.to_string(), "in_progress");
        assert_eq!(PollStatus::Stopped.to_string(), "stopped");
    }

    #[test]
    fn only_stopped_is_terminal() {
        assert!(!PollStatus::NotStarted.is_terminal());
        assert!(!PollStatus::InProgress.is_terminal());
        assert!(PollStatus::Stopped.is_terminal());
    }

    #[test]
    fn event_debug_contains_expected_fields() {
        let event = PollEvent::Poll {
            result: 7u32,
            status: PollStatus::InProgress,
        };

        let debug_str = format!("{event:?}");
        assert!(debug_str.contains("Poll"));
        assert!(debug_str.contains('7'));
        assert!(debug_str.contains("InProgress"));
    }

    #[test]
    fn event_status_accessor() {
        let poll = PollEvent::Poll {
            result: 1u32,
            status: PollStatus::InProgress,
        };
        let end = PollEvent::End {
            last_result: Some(1u32),
            status: PollStatus::Stopped,
        };
        let failed = PollEvent::<u32>::Failed {
            cycle: 3,
            message: "boom".to_string(),
            status: PollStatus::Stopped,
        };

        assert_eq!(poll.status(), PollStatus::InProgress);
        assert_eq!(end.status(), PollStatus::Stopped);
        assert_eq!(failed.status(), PollStatus::Stopped);
    }

    #[test]
    fn event_clone_preserves_data() {
        let event = PollEvent::End {
            last_result: Some("done".to_string()),
            status: PollStatus::Stopped,
        };

        let cloned = event.clone();

        if let (
            PollEvent::End { last_result: r1, status: s1 },
            PollEvent::End { last_result: r2, status: s2 },
        ) = (event, cloned)
        {
            assert_eq!(r1, r2);
            assert_eq!(s1, s2);
        } else {
            panic!("Event type mismatch after clone");
        }
    }
}
