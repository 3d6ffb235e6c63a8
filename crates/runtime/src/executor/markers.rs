use quest_core::TaskResult;

use super::{ExecutorResult, TaskContext, TaskExecutor};

/// Step and script terminators. They do no work; their result is the point.
pub struct MarkerExecutor {
    result: TaskResult,
}

impl MarkerExecutor {
    /// Advances the step counter.
    pub fn next_step() -> Self {
        Self {
            result: TaskResult::NextStep,
        }
    }

    pub fn end() -> Self {
        Self {
            result: TaskResult::End,
        }
    }

    pub fn skip_marker() -> Self {
        Self {
            result: TaskResult::TaskComplete,
        }
    }
}

impl TaskExecutor for MarkerExecutor {
    fn start(&mut self, _ctx: &mut TaskContext<'_>) -> ExecutorResult<bool> {
        Ok(true)
    }

    fn update(&mut self, _ctx: &mut TaskContext<'_>) -> ExecutorResult<TaskResult> {
        Ok(self.result)
    }
}
