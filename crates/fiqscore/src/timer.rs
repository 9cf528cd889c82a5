//! Per-question countdown.
//!
//! A countdown is a spawned task that sleeps until the deadline and then
//! reports [`TimerExpired`] on a channel. Only one countdown runs at a time:
//! starting a new one aborts the previous task.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

/// Sent when a question's deadline elapses.
///
/// `ticket` identifies the countdown that fired, so an expiry that raced a
/// newer question (which may reuse the same id) can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerExpired {
    /// Question the countdown was running for.
    pub question_id: String,
    /// Countdown generation.
    pub ticket: u64,
}

#[derive(Debug)]
struct TimerState {
    question_id: String,
    deadline: Instant,
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Owner of the single active countdown.
#[derive(Debug)]
pub struct Countdown {
    tx: UnboundedSender<TimerExpired>,
    active: Option<TimerState>,
    next_ticket: u64,
}

impl Countdown {
    /// Creates a countdown and the receiver its expiries arrive on.
    pub fn channel() -> (Self, UnboundedReceiver<TimerExpired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                active: None,
                next_ticket: 0,
            },
            rx,
        )
    }

    /// Starts a countdown for `question_id`, replacing any running one.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self), fields(secs = duration.as_secs()))]
    pub fn start(&mut self, question_id: &str, duration: Duration) {
        self.cancel();

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let deadline = Instant::now() + duration;
        let tx = self.tx.clone();
        let expired = TimerExpired {
            question_id: question_id.to_string(),
            ticket,
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            trace!(question_id = %expired.question_id, "Countdown elapsed");
            // Receiver gone means the controller was dropped.
            let _ = tx.send(expired);
        });

        debug!(ticket, "Countdown started");
        self.active = Some(TimerState {
            question_id: question_id.to_string(),
            deadline,
            ticket,
            handle,
        });
    }

    /// Stops the running countdown, if any.
    pub fn cancel(&mut self) {
        if let Some(state) = self.active.take() {
            state.handle.abort();
            trace!(question_id = %state.question_id, ticket = state.ticket, "Countdown cancelled");
        }
    }

    /// True if `expired` came from the countdown that is still active.
    pub fn matches(&self, expired: &TimerExpired) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.ticket == expired.ticket && s.question_id == expired.question_id)
    }

    /// Time left on the active countdown.
    pub fn remaining(&self) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|s| s.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
