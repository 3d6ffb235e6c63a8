use std::time::Duration;

use quest_core::{
    AbortReason, Attune, Conditions, Interact, MoveTo, ObjectId, Task, TaskResult,
    has_completion_flags,
};

use super::{ExecutorResult, RetryGate, TaskContext, TaskExecutor};

/// Arrival radius used when walking to an interaction object first.
const APPROACH_DISTANCE: f32 = 3.0;

pub struct InteractExecutor {
    task: Interact,
    object: Option<ObjectId>,
    detour: Vec<Task>,
    gate: RetryGate,
    saw_dialogue: bool,
}

impl InteractExecutor {
    pub fn new(task: Interact, gate_limit: u32, gate_delay: Duration) -> Self {
        Self {
            task,
            object: None,
            detour: Vec::new(),
            gate: RetryGate::new("interact", gate_limit, gate_delay),
            saw_dialogue: false,
        }
    }

    fn is_complete(&self, ctx: &TaskContext<'_>) -> bool {
        ctx.quest_work_matches(self.task.quest, &self.task.completion)
    }
}

impl TaskExecutor for InteractExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        if self.is_complete(ctx) {
            return Ok(false);
        }

        if let Some(object) = ctx.world.find_object(self.task.data_id) {
            self.object = Some(object.id);
            return Ok(true);
        }

        let player = ctx
            .world
            .player()
            .ok_or_else(|| AbortReason::Precondition("actor is not loaded".into()))?;
        match self.task.position {
            Some(position)
                if player.position.distance(position) > ctx.config.interact_search_radius =>
            {
                tracing::info!(
                    target: "runtime::executor",
                    data_id = %self.task.data_id,
                    %position,
                    "interaction object not in view, walking closer"
                );
                let mut approach = MoveTo::new(position, APPROACH_DISTANCE);
                approach.label = Some(format!("approach {}", self.task.data_id));
                let retry = Interact {
                    position: None,
                    ..self.task.clone()
                };
                self.detour = vec![Task::Move(approach), Task::Interact(retry)];
                Ok(true)
            }
            _ => Err(AbortReason::MissingObject {
                data_id: self.task.data_id,
            }),
        }
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if !self.detour.is_empty() {
            return Ok(TaskResult::CreateNewTasks);
        }
        if self.is_complete(ctx) {
            return Ok(TaskResult::TaskComplete);
        }

        let conditions = ctx.world.conditions();
        if conditions.contains(Conditions::OCCUPIED) {
            self.saw_dialogue = true;
            return Ok(TaskResult::StillRunning);
        }
        if self.saw_dialogue {
            if !has_completion_flags(&self.task.completion) {
                return Ok(TaskResult::TaskComplete);
            }
            // Dialogue ended without the expected progress; try again.
            self.saw_dialogue = false;
        }
        if conditions.is_busy() {
            return Ok(TaskResult::StillRunning);
        }

        let object = self.object.and_then(|id| ctx.world.object(id));
        let Some(object) = object else {
            if self.gate.attempts() > 0 {
                // Consumed by a previous interaction.
                return Ok(TaskResult::TaskComplete);
            }
            return Err(AbortReason::MissingObject {
                data_id: self.task.data_id,
            });
        };
        if !object.is_targetable {
            return Ok(TaskResult::StillRunning);
        }

        if self.gate.try_attempt(ctx.now())? {
            let accepted = ctx.world.interact(object.id);
            tracing::info!(
                target: "runtime::executor",
                object = %object.id,
                data_id = %object.data_id,
                attempt = self.gate.attempts(),
                accepted,
                "interacting"
            );
        }
        Ok(TaskResult::StillRunning)
    }

    fn should_interrupt_on_damage(&self) -> bool {
        true
    }

    fn take_new_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.detour)
    }
}

pub struct AttuneExecutor {
    task: Attune,
    object: Option<ObjectId>,
    gate: RetryGate,
}

impl AttuneExecutor {
    pub fn new(task: Attune, gate_limit: u32, gate_delay: Duration) -> Self {
        Self {
            task,
            object: None,
            gate: RetryGate::new("attune", gate_limit, gate_delay),
        }
    }
}

impl TaskExecutor for AttuneExecutor {
    fn start(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        if ctx.world.is_attuned(self.task.aetheryte) {
            return Ok(false);
        }
        let object = ctx
            .world
            .find_object(self.task.data_id)
            .ok_or(AbortReason::MissingObject {
                data_id: self.task.data_id,
            })?;
        self.object = Some(object.id);
        Ok(true)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        if ctx.world.is_attuned(self.task.aetheryte) {
            tracing::info!(target: "runtime::executor", aetheryte = %self.task.aetheryte, "attuned");
            return Ok(TaskResult::TaskComplete);
        }
        if ctx.world.conditions().is_busy() {
            return Ok(TaskResult::StillRunning);
        }
        let Some(object) = self.object.and_then(|id| ctx.world.object(id)) else {
            return Err(AbortReason::MissingObject {
                data_id: self.task.data_id,
            });
        };
        if self.gate.try_attempt(ctx.now())? {
            ctx.world.interact(object.id);
        }
        Ok(TaskResult::StillRunning)
    }

    fn should_interrupt_on_damage(&self) -> bool {
        true
    }
}
