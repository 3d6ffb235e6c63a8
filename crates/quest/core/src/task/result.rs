/// Outcome of a single executor update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskResult {
    /// Not done yet; poll again next tick.
    StillRunning,
    TaskComplete,
    /// The rest of the step is moot; jump to its terminal task.
    SkipRemainingTasksForStep,
    /// The step is finished; advance the external step counter.
    NextStep,
    /// Done, and the executor has follow-up tasks to splice in.
    CreateNewTasks,
    /// Stop the whole run.
    End,
}

impl TaskResult {
    /// Every result except [`TaskResult::StillRunning`] releases the executor.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskResult::StillRunning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_still_running_keeps_the_executor() {
        assert!(!TaskResult::StillRunning.is_terminal());
        assert!(TaskResult::TaskComplete.is_terminal());
        assert!(TaskResult::CreateNewTasks.is_terminal());
        assert!(TaskResult::End.is_terminal());
    }
}
