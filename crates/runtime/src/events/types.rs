use std::fmt;

use quest_core::{StepRef, TaskKind, TaskResult};
use serde::{Deserialize, Serialize};

/// Why the active task was preempted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptCause {
    /// The actor took damage while the task was interruptible.
    Damage,
    /// The host reported an action failure the task did not claim.
    Notification(String),
    /// The executor noticed the interruption itself.
    ExecutorReported,
    /// Requested by the host.
    Forced,
}

impl fmt::Display for InterruptCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptCause::Damage => f.write_str("damage"),
            InterruptCause::Notification(message) => write!(f, "notification: {message}"),
            InterruptCause::ExecutorReported => f.write_str("executor_reported"),
            InterruptCause::Forced => f.write_str("forced"),
        }
    }
}

/// Observable dispatcher transitions.
///
/// Tasks are identified by their kind and display label; the payloads are
/// not carried so events stay cheap to clone for every subscriber.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    TaskStarted {
        kind: String,
        label: String,
    },
    /// `start()` reported nothing to do.
    TaskSkipped {
        kind: String,
        label: String,
    },
    TaskFinished {
        kind: String,
        label: String,
        result: TaskResult,
    },
    Interrupted {
        label: Option<String>,
        cause: InterruptCause,
        inserted: usize,
    },
    StepAdvanced {
        step: StepRef,
        enqueued: usize,
    },
    RunEnded,
    RunAborted {
        reason: String,
    },
}

impl RunEvent {
    pub(crate) fn task_started(kind: TaskKind, label: String) -> Self {
        Self::TaskStarted {
            kind: kind.to_string(),
            label,
        }
    }

    pub(crate) fn task_skipped(kind: TaskKind, label: String) -> Self {
        Self::TaskSkipped {
            kind: kind.to_string(),
            label,
        }
    }

    pub(crate) fn task_finished(kind: TaskKind, label: String, result: TaskResult) -> Self {
        Self::TaskFinished {
            kind: kind.to_string(),
            label,
            result,
        }
    }
}
