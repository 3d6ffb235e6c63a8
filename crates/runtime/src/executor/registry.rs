//! Task-to-executor resolution.
//!
//! Built-in executors are resolved by an exhaustive `match` on [`Task`], so
//! adding a variant without an executor is a compile error. Hosts may replace
//! the executor for a whole [`TaskKind`] with their own factory.
use std::collections::HashMap;
use std::fmt;

use quest_core::{Task, TaskKind};

use super::{
    AttuneExecutor, DelayExecutor, FightExecutor, InteractExecutor, MarkerExecutor, MountExecutor,
    MoveExecutor, TaskExecutor, UnmountExecutor, UseItemExecutor, WaitConditionExecutor,
    WaitObjectExecutor, WaitQuestFlagsExecutor,
};
use crate::config::EngineConfig;

/// Constructor for a host-provided executor.
pub type ExecutorFactory = Box<dyn Fn(&Task, &EngineConfig) -> Box<dyn TaskExecutor>>;

#[derive(Default)]
pub struct ExecutorRegistry {
    overrides: HashMap<TaskKind, ExecutorFactory>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every task of `kind` to `factory` instead of the built-in executor.
    pub fn register<F>(&mut self, kind: TaskKind, factory: F)
    where
        F: Fn(&Task, &EngineConfig) -> Box<dyn TaskExecutor> + 'static,
    {
        if self.overrides.insert(kind, Box::new(factory)).is_some() {
            tracing::warn!(target: "runtime::executor", %kind, "replacing executor override");
        }
    }

    pub fn resolve(&self, task: &Task, config: &EngineConfig) -> Box<dyn TaskExecutor> {
        match self.overrides.get(&task.kind()) {
            Some(factory) => factory(task, config),
            None => builtin(task, config),
        }
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn builtin(task: &Task, config: &EngineConfig) -> Box<dyn TaskExecutor> {
    let retries = config.interaction_retry_limit;
    match task {
        Task::Move(task) => Box::new(MoveExecutor::new(task.clone())),
        Task::Mount => Box::new(MountExecutor::new(retries, config.action_timeout)),
        Task::Unmount => Box::new(UnmountExecutor::new(retries, config.action_timeout)),
        Task::Interact(task) => Box::new(InteractExecutor::new(
            task.clone(),
            retries,
            config.interaction_retry_delay,
        )),
        Task::UseItem(task) => Box::new(UseItemExecutor::new(
            task.clone(),
            retries,
            config.action_timeout,
        )),
        Task::Attune(task) => Box::new(AttuneExecutor::new(
            task.clone(),
            retries,
            config.interaction_retry_delay,
        )),
        Task::Fight(task) => Box::new(FightExecutor::new(task.clone())),
        Task::Delay(duration) => Box::new(DelayExecutor::new(*duration)),
        Task::WaitCondition(task) => Box::new(WaitConditionExecutor::new(task.clone())),
        Task::WaitQuestFlags(task) => Box::new(WaitQuestFlagsExecutor::new(task.clone())),
        Task::WaitObjectAtPosition(task) => Box::new(WaitObjectExecutor::new(task.clone())),
        Task::NextStep(_) => Box::new(MarkerExecutor::next_step()),
        Task::EndAutomation => Box::new(MarkerExecutor::end()),
        Task::SkipMarker => Box::new(MarkerExecutor::skip_marker()),
    }
}
