use std::time::Duration;

use quest_core::{Conditions, TaskResult};

use super::{ExecutorResult, RetryGate, TaskContext, TaskExecutor};

pub struct MountExecutor {
    gate: RetryGate,
}

impl MountExecutor {
    pub fn new(limit: u32, timeout: Duration) -> Self {
        Self {
            gate: RetryGate::new("mount", limit, timeout),
        }
    }
}

impl TaskExecutor for MountExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        let conditions = ctx.world.conditions();
        if conditions.intersects(Conditions::MOUNTED | Conditions::IN_COMBAT) {
            return Ok(false);
        }
        self.gate.try_attempt(ctx.now())?;
        if !ctx.world.mount() {
            tracing::debug!(target: "runtime::executor", "mounting not possible here");
            return Ok(false);
        }
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        let conditions = ctx.world.conditions();
        if conditions.contains(Conditions::MOUNTED) {
            return Ok(TaskResult::TaskComplete);
        }
        if conditions.contains(Conditions::IN_COMBAT) {
            tracing::debug!(target: "runtime::executor", "combat started before mounting, continuing on foot");
            return Ok(TaskResult::TaskComplete);
        }
        match self.gate.try_attempt(ctx.now()) {
            Ok(true) => {
                ctx.world.mount();
            }
            Ok(false) => {}
            Err(reason) => {
                // Walking is slower but still gets there.
                tracing::warn!(target: "runtime::executor", %reason, "giving up on mount");
                return Ok(TaskResult::TaskComplete);
            }
        }
        Ok(TaskResult::StillRunning)
    }
}

pub struct UnmountExecutor {
    gate: RetryGate,
}

impl UnmountExecutor {
    pub fn new(limit: u32, timeout: Duration) -> Self {
        Self {
            gate: RetryGate::new("unmount", limit, timeout),
        }
    }
}

impl TaskExecutor for UnmountExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        if !ctx.world.conditions().contains(Conditions::MOUNTED) {
            return Ok(false);
        }
        self.gate.try_attempt(ctx.now())?;
        ctx.world.unmount();
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if !ctx.world.conditions().contains(Conditions::MOUNTED) {
            return Ok(TaskResult::TaskComplete);
        }
        if self.gate.try_attempt(ctx.now())? {
            ctx.world.unmount();
        }
        Ok(TaskResult::StillRunning)
    }
}
