//! Callbacks from the dispatcher to the step driver.
use quest_core::{StepRef, Task};

/// Receives step bookkeeping and the single error notification of an abort.
///
/// The dispatcher never compiles steps itself. When a step finishes, the
/// hook may hand back the next step's tasks.
pub trait StepHooks {
    /// A task finished with `TaskComplete` or `CreateNewTasks`.
    fn on_task_complete(&mut self, _task: &Task) {}

    /// The step's terminal task ran. Returned tasks are enqueued.
    fn on_next_step(&mut self, _step: StepRef) -> Vec<Task> {
        Vec::new()
    }

    fn on_run_end(&mut self) {}

    /// Called exactly once per aborted run.
    fn notify_error(&mut self, message: &str);
}

/// Hooks that only log.
#[derive(Debug, Default)]
pub struct LoggingHooks;

impl StepHooks for LoggingHooks {
    fn notify_error(&mut self, message: &str) {
        tracing::error!(target: "runtime::dispatcher", %message, "run aborted");
    }
}
