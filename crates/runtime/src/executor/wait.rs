use std::time::{Duration, Instant};

use quest_core::{TaskResult, WaitCondition, WaitObjectAtPosition, WaitQuestFlags};

use super::{ExecutorResult, TaskContext, TaskExecutor};

pub struct DelayExecutor {
    duration: Duration,
    deadline: Option<Instant>,
}

impl DelayExecutor {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }
}

impl TaskExecutor for DelayExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        self.deadline = Some(ctx.now() + self.duration);
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        let now = ctx.now();
        if self.deadline.is_none_or(|deadline| now >= deadline) {
            return Ok(TaskResult::TaskComplete);
        }
        Ok(TaskResult::StillRunning)
    }
}

pub struct WaitConditionExecutor {
    task: WaitCondition,
}

impl WaitConditionExecutor {
    pub fn new(task: WaitCondition) -> Self {
        Self { task }
    }

    fn satisfied(&self, ctx: &TaskContext<'_>) -> bool {
        ctx.world.conditions().contains(self.task.condition) == self.task.expected
    }
}

impl TaskExecutor for WaitConditionExecutor {
    fn start(&mut self, _ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if self.satisfied(ctx) {
            return Ok(TaskResult::TaskComplete);
        }
        Ok(TaskResult::StillRunning)
    }
}

pub struct WaitQuestFlagsExecutor {
    task: WaitQuestFlags,
}

impl WaitQuestFlagsExecutor {
    pub fn new(task: WaitQuestFlags) -> Self {
        Self { task }
    }
}

impl TaskExecutor for WaitQuestFlagsExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        Ok(!ctx.quest_work_matches(Some(self.task.quest), &self.task.flags))
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if ctx.quest_work_matches(Some(self.task.quest), &self.task.flags) {
            return Ok(TaskResult::TaskComplete);
        }
        Ok(TaskResult::StillRunning)
    }
}

pub struct WaitObjectExecutor {
    task: WaitObjectAtPosition,
}

impl WaitObjectExecutor {
    pub fn new(task: WaitObjectAtPosition) -> Self {
        Self { task }
    }
}

impl TaskExecutor for WaitObjectExecutor {
    fn start(&mut self, _ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        let arrived = ctx.world.objects().iter().any(|object| {
            object.data_id == self.task.data_id
                && !object.is_dead
                && object.position.distance(self.task.position) <= self.task.tolerance
        });
        if arrived {
            return Ok(TaskResult::TaskComplete);
        }
        Ok(TaskResult::StillRunning)
    }
}
