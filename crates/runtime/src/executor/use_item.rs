use std::time::Duration;

use quest_core::{AbortReason, Conditions, ObjectId, TaskResult, UseItem, has_completion_flags};

use super::{ExecutorResult, RetryGate, TaskContext, TaskExecutor};

pub struct UseItemExecutor {
    task: UseItem,
    target: Option<ObjectId>,
    gate: RetryGate,
    used: bool,
    casting: bool,
    interrupted: bool,
}

impl UseItemExecutor {
    pub fn new(task: UseItem, gate_limit: u32, gate_delay: Duration) -> Self {
        Self {
            task,
            target: None,
            gate: RetryGate::new("use item", gate_limit, gate_delay),
            used: false,
            casting: false,
            interrupted: false,
        }
    }

    fn is_complete(&self, ctx: &TaskContext<'_>) -> bool {
        ctx.quest_work_matches(self.task.quest, &self.task.completion)
    }

    fn missing_item(&self) -> AbortReason {
        AbortReason::MissingItem {
            item: self.task.item,
        }
    }
}

impl TaskExecutor for UseItemExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        if self.is_complete(ctx) {
            return Ok(false);
        }
        if ctx.world.item_count(self.task.item) == 0 {
            return Err(self.missing_item());
        }
        if let Some(data_id) = self.task.target {
            let object = ctx
                .world
                .find_object(data_id)
                .ok_or(AbortReason::MissingObject { data_id })?;
            self.target = Some(object.id);
        }
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if self.is_complete(ctx) {
            return Ok(TaskResult::TaskComplete);
        }

        let conditions = ctx.world.conditions();
        if conditions.contains(Conditions::CASTING) {
            self.casting = self.used;
            return Ok(TaskResult::StillRunning);
        }
        if self.used && !has_completion_flags(&self.task.completion) {
            return Ok(TaskResult::TaskComplete);
        }
        self.casting = false;
        if conditions.is_busy() {
            return Ok(TaskResult::StillRunning);
        }
        if ctx.world.item_count(self.task.item) == 0 {
            return Err(self.missing_item());
        }

        if self.gate.try_attempt(ctx.now())? {
            self.used = ctx.world.use_item(self.task.item, self.target);
            tracing::info!(
                target: "runtime::executor",
                item = %self.task.item,
                attempt = self.gate.attempts(),
                accepted = self.used,
                "using item"
            );
        }
        Ok(TaskResult::StillRunning)
    }

    fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    fn should_interrupt_on_damage(&self) -> bool {
        true
    }

    fn claim_notification(&mut self, ctx: &mut TaskContext<'_>, message: &str) -> bool {
        let casting = self.casting || ctx.world.conditions().contains(Conditions::CASTING);
        if self.used && casting && ctx.config.is_interrupt_message(message) {
            tracing::warn!(target: "runtime::executor", item = %self.task.item, %message, "cast cancelled");
            self.interrupted = true;
            return true;
        }
        false
    }
}
