use quest_core::{Fight, TaskResult, has_completion_flags};

use super::{ExecutorResult, TaskContext, TaskExecutor};
use crate::combat::CombatStatus;

/// Drives one encounter through the combat engine.
pub struct FightExecutor {
    task: Fight,
}

impl FightExecutor {
    pub fn new(task: Fight) -> Self {
        Self { task }
    }

    fn progress_reached(&self, ctx: &TaskContext<'_>) -> bool {
        ctx.quest_work_matches(self.task.combat.quest, &self.task.combat.completion)
    }
}

impl TaskExecutor for FightExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        ctx.combat.start(self.task.combat.clone(), &mut *ctx.world)?;
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if self.progress_reached(ctx) {
            tracing::info!(target: "runtime::executor", "encounter objective reached");
            ctx.combat.stop(&mut *ctx.world);
            return Ok(TaskResult::TaskComplete);
        }

        match ctx.combat.update(&mut *ctx.world) {
            CombatStatus::Complete
                if has_completion_flags(&self.task.combat.completion)
                    && self.task.combat.quest.is_some() =>
            {
                tracing::debug!(target: "runtime::executor", "enemies cleared, waiting for quest progress");
                ctx.combat.rearm();
                Ok(TaskResult::StillRunning)
            }
            CombatStatus::Complete => {
                ctx.combat.stop(&mut *ctx.world);
                Ok(TaskResult::TaskComplete)
            }
            CombatStatus::NotStarted | CombatStatus::InCombat | CombatStatus::Moving => {
                Ok(TaskResult::StillRunning)
            }
        }
    }
}
