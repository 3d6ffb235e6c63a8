//! Frame-driven task dispatcher.
//!
//! The dispatcher owns the queue, the active executor and the combat engine.
//! The host calls [`Dispatcher::tick`] once per frame; each tick:
//!
//! 1. drains inbound [`Signal`]s (damage, error notifications, control)
//! 2. with no active executor, dequeues and starts the next task
//! 3. otherwise updates the active executor and acts on its [`TaskResult`]
//!
//! Nothing blocks: waiting is an executor returning
//! [`TaskResult::StillRunning`]. Executor failures abort the run with one
//! hook notification and one log entry; they never escape `tick`.
mod hooks;
mod recovery;
mod signals;

pub use hooks::{LoggingHooks, StepHooks};
pub use recovery::recovery_tasks;
pub use signals::{Signal, SignalSender};

use quest_core::{AbortReason, ErrorSeverity, Task, TaskKind, TaskResult};
use tokio::sync::{broadcast, mpsc};

use crate::api::{Result, RuntimeError};
use crate::combat::CombatEngine;
use crate::combat::modules::{CombatModule, default_modules};
use crate::config::EngineConfig;
use crate::events::{EventBus, InterruptCause, RunEvent, Topic};
use crate::executor::{ExecutorRegistry, TaskContext, TaskExecutor};
use crate::queue::TaskQueue;
use crate::world::World;

/// Lifecycle of the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    /// No run was started, or it was stopped.
    #[default]
    Idle,
    Running,
    /// An `EndAutomation` task finished.
    Ended,
    /// An executor failed; see [`Dispatcher::last_abort`].
    Aborted,
}

struct ActiveTask {
    task: Task,
    label: String,
    executor: Box<dyn TaskExecutor>,
}

enum Activation {
    Started,
    Skipped,
    Aborted,
}

pub struct Dispatcher {
    config: EngineConfig,
    queue: TaskQueue,
    active: Option<ActiveTask>,
    registry: ExecutorRegistry,
    combat: CombatEngine,
    hooks: Box<dyn StepHooks>,
    signal_tx: mpsc::UnboundedSender<Signal>,
    signal_rx: mpsc::UnboundedReceiver<Signal>,
    events: EventBus,
    state: RunState,
    last_abort: Option<AbortReason>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    // ===== control =====

    /// Replaces any leftover work with `tasks` and starts running.
    pub fn start_run<I>(&mut self, tasks: I) -> Result<()>
    where
        I: IntoIterator<Item = Task>,
    {
        if self.state == RunState::Running {
            return Err(RuntimeError::AlreadyRunning);
        }
        self.queue.reset();
        self.queue.enqueue_all(tasks);
        self.active = None;
        self.last_abort = None;
        self.state = RunState::Running;
        tracing::info!(
            target: "runtime::dispatcher",
            tasks = self.queue.remaining().len(),
            "run started"
        );
        Ok(())
    }

    /// Appends tasks to the running queue.
    pub fn enqueue<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        self.queue.enqueue_all(tasks);
    }

    /// Drops the active task and all queued work. Idempotent.
    pub fn stop(&mut self, world: &mut dyn World) {
        if self.state == RunState::Running {
            tracing::info!(target: "runtime::dispatcher", "run stopped");
        }
        self.clear_run(world);
        self.state = RunState::Idle;
    }

    /// Discards the rest of the current step and runs its terminal task.
    pub fn skip_step(&mut self, world: &mut dyn World) -> Result<()> {
        self.ensure_running()?;
        tracing::info!(target: "runtime::dispatcher", "skipping rest of step");
        self.skip_remaining(world);
        Ok(())
    }

    /// Preempts the active task with the recovery sequence.
    pub fn interrupt(&mut self, world: &mut dyn World) -> Result<()> {
        self.ensure_running()?;
        self.interrupt_active(world, InterruptCause::Forced);
        Ok(())
    }

    /// Sender for host callbacks; signals are handled on the next tick.
    pub fn signals(&self) -> SignalSender {
        SignalSender::new(self.signal_tx.clone())
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<RunEvent> {
        self.events.subscribe(topic)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ===== introspection =====

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Running, but with no active task and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.state == RunState::Running && self.active.is_none() && self.queue.is_empty()
    }

    pub fn remaining(&self) -> &[Task] {
        self.queue.remaining()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_ref().map(|active| &active.task)
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.label.as_str())
    }

    pub fn last_abort(&self) -> Option<&AbortReason> {
        self.last_abort.as_ref()
    }

    /// `Err(Aborted)` if the last run aborted.
    pub fn outcome(&self) -> Result<RunState> {
        match &self.last_abort {
            Some(reason) => Err(RuntimeError::Aborted(reason.clone())),
            None => Ok(self.state),
        }
    }

    pub fn combat(&self) -> &CombatEngine {
        &self.combat
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===== tick =====

    pub fn tick(&mut self, world: &mut dyn World) -> RunState {
        self.drain_signals(world);
        if self.state != RunState::Running {
            return self.state;
        }

        match self.active.take() {
            None => {
                if let Some(task) = self.queue.dequeue() {
                    self.activate(task, world);
                }
            }
            Some(active) => self.advance(active, world),
        }
        self.state
    }

    fn drain_signals(&mut self, world: &mut dyn World) {
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.handle_signal(signal, world);
        }
    }

    fn handle_signal(&mut self, signal: Signal, world: &mut dyn World) {
        if self.state != RunState::Running && signal != Signal::Stop {
            tracing::trace!(target: "runtime::dispatcher", ?signal, "ignoring signal, no run");
            return;
        }

        match signal {
            Signal::Stop => self.stop(world),
            Signal::SkipStep => {
                tracing::info!(target: "runtime::dispatcher", "skipping rest of step");
                self.skip_remaining(world);
            }
            Signal::Interrupt => self.interrupt_active(world, InterruptCause::Forced),
            Signal::Damaged { source } => {
                let interruptible = self
                    .active
                    .as_ref()
                    .is_some_and(|active| active.executor.should_interrupt_on_damage());
                if interruptible {
                    tracing::debug!(target: "runtime::dispatcher", ?source, "damage taken");
                    self.interrupt_active(world, InterruptCause::Damage);
                }
            }
            Signal::ErrorNotification(message) => {
                let Some(mut active) = self.active.take() else {
                    return;
                };
                let claimed = {
                    let mut ctx = TaskContext {
                        world: &mut *world,
                        combat: &mut self.combat,
                        config: &self.config,
                    };
                    active.executor.claim_notification(&mut ctx, &message)
                };
                self.active = Some(active);

                if claimed {
                    tracing::debug!(target: "runtime::dispatcher", %message, "notification claimed by executor");
                } else if self.config.is_interrupt_message(&message) {
                    self.interrupt_active(world, InterruptCause::Notification(message));
                }
            }
        }
    }

    fn activate(&mut self, task: Task, world: &mut dyn World) -> Activation {
        let mut executor = self.registry.resolve(&task, &self.config);
        let label = task.to_string();
        let kind = task.kind();

        let started = {
            let mut ctx = TaskContext {
                world: &mut *world,
                combat: &mut self.combat,
                config: &self.config,
            };
            executor.start(&mut ctx)
        };

        match started {
            Ok(true) => {
                tracing::info!(target: "runtime::dispatcher", task = %label, "task started");
                self.events.publish(RunEvent::task_started(kind, label.clone()));
                self.active = Some(ActiveTask {
                    task,
                    label,
                    executor,
                });
                Activation::Started
            }
            Ok(false) => {
                tracing::debug!(target: "runtime::dispatcher", task = %label, "nothing to do, skipped");
                self.queue.clear_active();
                self.events.publish(RunEvent::task_skipped(kind, label));
                Activation::Skipped
            }
            Err(reason) => {
                self.abort(reason, Some(label.as_str()), world);
                Activation::Aborted
            }
        }
    }

    fn advance(&mut self, mut active: ActiveTask, world: &mut dyn World) {
        if active.executor.was_interrupted() {
            self.active = Some(active);
            self.interrupt_active(world, InterruptCause::ExecutorReported);
            return;
        }

        let result = {
            let mut ctx = TaskContext {
                world: &mut *world,
                combat: &mut self.combat,
                config: &self.config,
            };
            active.executor.update(&mut ctx)
        };

        let result = match result {
            Ok(result) if !result.is_terminal() => {
                self.active = Some(active);
                return;
            }
            Ok(result) => result,
            Err(reason) => {
                self.abort(reason, Some(active.label.as_str()), world);
                return;
            }
        };

        tracing::info!(target: "runtime::dispatcher", task = %active.label, %result, "task finished");
        self.events.publish(RunEvent::task_finished(
            active.task.kind(),
            active.label.clone(),
            result,
        ));
        self.queue.clear_active();

        match result {
            TaskResult::StillRunning => {}
            TaskResult::TaskComplete => self.hooks.on_task_complete(&active.task),
            TaskResult::CreateNewTasks => {
                let tasks = active.executor.take_new_tasks();
                tracing::debug!(
                    target: "runtime::dispatcher",
                    task = %active.label,
                    new_tasks = tasks.len(),
                    "splicing follow-up tasks"
                );
                self.hooks.on_task_complete(&active.task);
                self.queue.insert_next(tasks);
            }
            TaskResult::SkipRemainingTasksForStep => self.skip_remaining(world),
            TaskResult::NextStep => self.advance_step(&active.task),
            TaskResult::End => self.end_run(world),
        }
    }

    fn advance_step(&mut self, task: &Task) {
        let Task::NextStep(step) = task else {
            tracing::warn!(
                target: "runtime::dispatcher",
                task = %task,
                "step advance requested by a task without a step reference"
            );
            return;
        };
        let next = self.hooks.on_next_step(*step);
        let enqueued = next.len();
        self.queue.enqueue_all(next);
        tracing::info!(target: "runtime::dispatcher", %step, enqueued, "step advanced");
        self.events.publish(RunEvent::StepAdvanced {
            step: *step,
            enqueued,
        });
    }

    /// Drops queued tasks up to the step's terminal task and activates it.
    fn skip_remaining(&mut self, world: &mut dyn World) {
        self.active = None;
        self.queue.clear_active();
        self.combat.stop(world);

        while let Some(task) = self.queue.dequeue() {
            if !task.is_step_terminal() {
                tracing::debug!(target: "runtime::dispatcher", task = %task, "skipped");
                self.queue.clear_active();
                continue;
            }
            match self.activate(task, world) {
                Activation::Started | Activation::Aborted => return,
                Activation::Skipped => {}
            }
        }
        tracing::debug!(target: "runtime::dispatcher", "no terminal task left to skip to");
    }

    fn interrupt_active(&mut self, world: &mut dyn World, cause: InterruptCause) {
        let label = self.active.take().map(|active| active.label);
        self.combat.stop(world);

        let tasks = recovery_tasks(world.conditions(), &self.config);
        let inserted = tasks.len();
        self.queue.interrupt_with(tasks);

        tracing::warn!(
            target: "runtime::dispatcher",
            task = label.as_deref().unwrap_or("-"),
            %cause,
            inserted,
            "task interrupted"
        );
        self.events.publish(RunEvent::Interrupted {
            label,
            cause,
            inserted,
        });
    }

    fn end_run(&mut self, world: &mut dyn World) {
        self.clear_run(world);
        self.state = RunState::Ended;
        self.hooks.on_run_end();
        tracing::info!(target: "runtime::dispatcher", "run ended");
        self.events.publish(RunEvent::RunEnded);
    }

    fn abort(&mut self, reason: AbortReason, label: Option<&str>, world: &mut dyn World) {
        let task = label.unwrap_or("-");
        let severity = reason.severity();
        match severity {
            ErrorSeverity::Expected => {
                tracing::warn!(
                    target: "runtime::dispatcher",
                    task,
                    %reason,
                    severity = severity.as_str(),
                    "run aborted"
                );
            }
            ErrorSeverity::Unexpected => {
                tracing::error!(
                    target: "runtime::dispatcher",
                    task,
                    %reason,
                    severity = severity.as_str(),
                    "run aborted by fault"
                );
            }
        }

        let message = reason.to_string();
        self.hooks.notify_error(&message);
        self.events.publish(RunEvent::RunAborted { reason: message });

        self.clear_run(world);
        self.state = RunState::Aborted;
        self.last_abort = Some(reason);
    }

    fn clear_run(&mut self, world: &mut dyn World) {
        self.active = None;
        self.queue.reset();
        self.combat.stop(world);
    }

    fn ensure_running(&self) -> Result<()> {
        if self.state == RunState::Running {
            Ok(())
        } else {
            Err(RuntimeError::NotRunning)
        }
    }
}

pub struct DispatcherBuilder {
    config: EngineConfig,
    registry: ExecutorRegistry,
    modules: Option<Vec<Box<dyn CombatModule>>>,
    hooks: Option<Box<dyn StepHooks>>,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: ExecutorRegistry::new(),
            modules: None,
            hooks: None,
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: impl StepHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Replaces the default combat modules. Order decides which module claims an encounter.
    pub fn combat_modules(mut self, modules: Vec<Box<dyn CombatModule>>) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Routes tasks of `kind` to a custom executor.
    pub fn executor<F>(mut self, kind: TaskKind, factory: F) -> Self
    where
        F: Fn(&Task, &EngineConfig) -> Box<dyn TaskExecutor> + 'static,
    {
        self.registry.register(kind, factory);
        self
    }

    pub fn build(self) -> Dispatcher {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let modules = self.modules.unwrap_or_else(default_modules);
        let events = EventBus::with_capacity(self.config.event_buffer_size);

        Dispatcher {
            combat: CombatEngine::new(modules, self.config.clone()),
            config: self.config,
            queue: TaskQueue::new(),
            active: None,
            registry: self.registry,
            hooks: self.hooks.unwrap_or_else(|| Box::new(LoggingHooks)),
            signal_tx,
            signal_rx,
            events,
            state: RunState::Idle,
            last_abort: None,
        }
    }
}
