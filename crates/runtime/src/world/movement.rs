//! Non-blocking movement handles.
//!
//! A movement request is a tokio `oneshot` pair: the host keeps the
//! [`MoveCompleter`] and reports arrival or failure, the engine keeps the
//! [`MoveHandle`] and polls it once per tick with `try_recv`. Nothing here
//! awaits; the dispatcher stays single-threaded and frame-driven.
//!
//! Dropping a handle closes its cancellation channel, so a host can notice
//! that nobody is waiting for a route any more.
use std::time::Instant;

use quest_core::Position;
use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no path to destination")]
    NoPath,

    #[error("movement blocked")]
    Blocked,

    #[error("movement cancelled by host")]
    Cancelled,
}

/// Result of polling a pending movement.
#[derive(Clone, Debug, PartialEq)]
pub enum MovePoll {
    Pending,
    Arrived,
    Failed(MoveError),
    TimedOut,
}

/// Engine side of a movement request.
#[derive(Debug)]
pub struct MoveHandle {
    outcome: oneshot::Receiver<Result<(), MoveError>>,
    cancel: Option<oneshot::Sender<()>>,
}

/// Host side of a movement request.
#[derive(Debug)]
pub struct MoveCompleter {
    outcome: oneshot::Sender<Result<(), MoveError>>,
    cancel: oneshot::Receiver<()>,
}

impl MoveHandle {
    /// Creates a connected handle/completer pair.
    pub fn channel() -> (MoveHandle, MoveCompleter) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        (
            MoveHandle {
                outcome: outcome_rx,
                cancel: Some(cancel_tx),
            },
            MoveCompleter {
                outcome: outcome_tx,
                cancel: cancel_rx,
            },
        )
    }

    /// A handle that reports `result` on the first poll.
    pub fn resolved(result: Result<(), MoveError>) -> Self {
        let (handle, completer) = Self::channel();
        completer.finish(result);
        handle
    }

    /// Asks the host to abandon the route. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    fn try_outcome(&mut self) -> Option<Result<(), MoveError>> {
        match self.outcome.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            // Completer dropped without reporting.
            Err(TryRecvError::Closed) => Some(Err(MoveError::Cancelled)),
        }
    }
}

impl MoveCompleter {
    pub fn finish(self, result: Result<(), MoveError>) {
        // The engine may already have given up on this route.
        let _ = self.outcome.send(result);
    }

    pub fn arrive(self) {
        self.finish(Ok(()));
    }

    pub fn fail(self, error: MoveError) {
        self.finish(Err(error));
    }

    /// True once the engine cancelled or dropped its handle.
    pub fn is_cancelled(&mut self) -> bool {
        !matches!(self.cancel.try_recv(), Err(TryRecvError::Empty))
    }
}

/// A movement request bound to its destination and deadline.
#[derive(Debug)]
pub struct PendingMove {
    handle: MoveHandle,
    destination: Position,
    deadline: Instant,
}

impl PendingMove {
    pub fn new(handle: MoveHandle, destination: Position, deadline: Instant) -> Self {
        Self {
            handle,
            destination,
            deadline,
        }
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    /// Polls the host outcome; past the deadline a still-pending move times out
    /// and is cancelled.
    pub fn poll(&mut self, now: Instant) -> MovePoll {
        match self.handle.try_outcome() {
            Some(Ok(())) => MovePoll::Arrived,
            Some(Err(error)) => MovePoll::Failed(error),
            None if now >= self.deadline => {
                self.handle.cancel();
                MovePoll::TimedOut
            }
            None => MovePoll::Pending,
        }
    }

    pub fn cancel(&mut self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn pending_until_completed() {
        let (handle, completer) = MoveHandle::channel();
        let now = Instant::now();
        let mut pending = PendingMove::new(handle, Position::ORIGIN, now + Duration::from_secs(10));

        assert_eq!(pending.poll(now), MovePoll::Pending);
        completer.arrive();
        assert_eq!(pending.poll(now), MovePoll::Arrived);
    }

    #[test]
    fn times_out_and_cancels_host_route() {
        let (handle, mut completer) = MoveHandle::channel();
        let now = Instant::now();
        let mut pending = PendingMove::new(handle, Position::ORIGIN, now + Duration::from_secs(10));

        assert!(!completer.is_cancelled());
        assert_eq!(pending.poll(now + Duration::from_secs(10)), MovePoll::TimedOut);
        assert!(completer.is_cancelled());
    }

    #[test]
    fn dropped_completer_reads_as_cancelled() {
        let (handle, completer) = MoveHandle::channel();
        drop(completer);
        let now = Instant::now();
        let mut pending = PendingMove::new(handle, Position::ORIGIN, now);
        assert_eq!(pending.poll(now), MovePoll::Failed(MoveError::Cancelled));
    }

    #[test]
    fn dropping_the_handle_signals_the_host() {
        let (handle, mut completer) = MoveHandle::channel();
        drop(handle);
        assert!(completer.is_cancelled());
    }
}
