//! Task executors.
//!
//! Each [`Task`] variant is driven by one executor type, created fresh every
//! time the task becomes active (see [`ExecutorRegistry`]). Executors hold all
//! transient state of an activation: timers, retry counters and movement
//! handles. Discarding an executor discards that state; the task itself is
//! immutable and can be re-activated from scratch.
//!
//! # Protocol
//!
//! 1. `start()` once. `Ok(false)` means there is nothing to do and the task is
//!    dropped; `Err` aborts the run.
//! 2. `update()` once per tick until it returns anything but
//!    [`TaskResult::StillRunning`].
mod fight;
mod interact;
mod markers;
mod mount;
mod move_to;
mod registry;
mod use_item;
mod wait;

pub use fight::FightExecutor;
pub use interact::{AttuneExecutor, InteractExecutor};
pub use markers::MarkerExecutor;
pub use mount::{MountExecutor, UnmountExecutor};
pub use move_to::MoveExecutor;
pub use registry::{ExecutorFactory, ExecutorRegistry};
pub use use_item::UseItemExecutor;
pub use wait::{DelayExecutor, WaitConditionExecutor, WaitObjectExecutor, WaitQuestFlagsExecutor};

use std::time::{Duration, Instant};

use quest_core::{AbortReason, QuestId, QuestWorkValue, Task, TaskResult, matches_quest_work};

use crate::combat::CombatEngine;
use crate::config::EngineConfig;
use crate::world::World;

pub type ExecutorResult<T> = Result<T, AbortReason>;

/// Everything an executor may touch during one call.
pub struct TaskContext<'a> {
    pub world: &'a mut dyn World,
    pub combat: &'a mut CombatEngine,
    pub config: &'a EngineConfig,
}

impl TaskContext<'_> {
    pub fn now(&self) -> Instant {
        self.world.now()
    }

    /// Whether `completion` is non-empty and matches the live progress of `quest`.
    pub fn quest_work_matches(
        &self,
        quest: Option<QuestId>,
        completion: &[Option<QuestWorkValue>],
    ) -> bool {
        quest
            .and_then(|quest| self.world.quest_progress(quest))
            .is_some_and(|progress| matches_quest_work(completion, &progress))
    }
}

pub trait TaskExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool>;

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult>;

    /// Set when the executor noticed on its own that its work was cut short.
    fn was_interrupted(&self) -> bool {
        false
    }

    /// Whether damage taken during this task should preempt it.
    fn should_interrupt_on_damage(&self) -> bool {
        false
    }

    /// Offered every host error notification first. Returning true claims it
    /// and suppresses the dispatcher's own interruption handling.
    fn claim_notification(&mut self, _ctx: &mut TaskContext<'_>, _message: &str) -> bool {
        false
    }

    /// Follow-up tasks after [`TaskResult::CreateNewTasks`].
    fn take_new_tasks(&mut self) -> Vec<Task> {
        Vec::new()
    }
}

/// Bounded, spaced-out retries of a host action.
#[derive(Clone, Debug)]
pub(crate) struct RetryGate {
    action: &'static str,
    limit: u32,
    delay: Duration,
    attempts: u32,
    last: Option<Instant>,
}

impl RetryGate {
    pub(crate) fn new(action: &'static str, limit: u32, delay: Duration) -> Self {
        Self {
            action,
            limit,
            delay,
            attempts: 0,
            last: None,
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns `Ok(true)` if an attempt should be made now and records it.
    ///
    /// Attempts are at least `delay` apart. Once `limit` attempts have been
    /// made, the next due attempt fails with [`AbortReason::RetriesExhausted`].
    pub(crate) fn try_attempt(&mut self, now: Instant) -> ExecutorResult<bool> {
        if let Some(last) = self.last
            && now.duration_since(last) < self.delay
        {
            return Ok(false);
        }
        if self.attempts >= self.limit {
            return Err(AbortReason::RetriesExhausted {
                action: self.action,
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        self.last = Some(now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_gate_spaces_and_bounds_attempts() {
        let now = Instant::now();
        let mut gate = RetryGate::new("interact", 2, Duration::from_secs(3));

        assert_eq!(gate.try_attempt(now), Ok(true));
        assert_eq!(gate.try_attempt(now + Duration::from_secs(1)), Ok(false));
        assert_eq!(gate.try_attempt(now + Duration::from_secs(3)), Ok(true));
        assert_eq!(
            gate.try_attempt(now + Duration::from_secs(6)),
            Err(AbortReason::RetriesExhausted {
                action: "interact",
                attempts: 2
            })
        );
        assert_eq!(gate.attempts(), 2);
    }
}
