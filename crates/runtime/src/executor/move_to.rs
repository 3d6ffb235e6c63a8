use quest_core::{AbortReason, Conditions, MoveTo, TaskResult};

use super::{ExecutorResult, TaskContext, TaskExecutor};
use crate::world::{MovePoll, PendingMove};

/// Host message telling the actor it cannot move right now.
const CANNOT_MOVE: &str = "cannot move";

pub struct MoveExecutor {
    task: MoveTo,
    pending: Option<PendingMove>,
    attempts: u32,
    mounted: bool,
}

impl MoveExecutor {
    pub fn new(task: MoveTo) -> Self {
        Self {
            task,
            pending: None,
            attempts: 0,
            mounted: false,
        }
    }

    fn issue(&mut self, ctx: &mut TaskContext<'_>, distance: f32) {
        let destination = self.task.destination;
        let stop_distance = self.task.stop_distance;
        let handle = if !self.task.use_pathfinding && distance <= ctx.config.direct_move_threshold {
            ctx.world.move_direct(destination, stop_distance)
        } else {
            ctx.world.navigate_to(destination, stop_distance)
        };
        self.attempts += 1;
        self.pending = Some(PendingMove::new(
            handle,
            destination,
            ctx.now() + ctx.config.move_timeout,
        ));
        tracing::debug!(
            target: "runtime::executor",
            %destination,
            distance,
            attempt = self.attempts,
            "movement issued"
        );
    }

    fn distance(&self, ctx: &TaskContext<'_>) -> ExecutorResult<f32> {
        let player = ctx
            .world
            .player()
            .ok_or_else(|| AbortReason::Precondition("actor is not loaded".into()))?;
        Ok(player.position.distance(self.task.destination))
    }
}

impl TaskExecutor for MoveExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        let distance = self.distance(ctx)?;
        if distance <= self.task.stop_distance {
            return Ok(false);
        }
        self.mounted = ctx.world.conditions().contains(Conditions::MOUNTED);
        self.issue(ctx, distance);
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        let now = ctx.now();
        let Some(pending) = self.pending.as_mut() else {
            let distance = self.distance(ctx)?;
            self.issue(ctx, distance);
            return Ok(TaskResult::StillRunning);
        };

        let reason = match pending.poll(now) {
            MovePoll::Pending => return Ok(TaskResult::StillRunning),
            MovePoll::Arrived => {
                self.pending = None;
                return Ok(TaskResult::TaskComplete);
            }
            MovePoll::Failed(error) => error.to_string(),
            MovePoll::TimedOut => "timed out".to_owned(),
        };
        self.pending = None;

        if self.attempts > ctx.config.move_retry_limit {
            return Err(AbortReason::MovementFailed {
                destination: self.task.destination,
                reason,
            });
        }
        tracing::warn!(
            target: "runtime::executor",
            destination = %self.task.destination,
            %reason,
            attempt = self.attempts,
            "movement failed, retrying"
        );
        let distance = self.distance(ctx)?;
        self.issue(ctx, distance);
        Ok(TaskResult::StillRunning)
    }

    fn should_interrupt_on_damage(&self) -> bool {
        !self.mounted
    }

    fn claim_notification(&mut self, ctx: &mut TaskContext<'_>, message: &str) -> bool {
        if !message.to_lowercase().contains(CANNOT_MOVE) {
            return false;
        }
        if let Some(mut pending) = self.pending.take() {
            pending.cancel();
            ctx.world.stop_movement();
        }
        // Re-issued on the next update without spending a retry.
        self.attempts = self.attempts.saturating_sub(1);
        true
    }
}
