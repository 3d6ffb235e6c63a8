//! Frame-driven quest automation runtime.
//!
//! This crate turns compiled quest steps ([`quest_core::Task`] lists) into
//! actions against a host game through the [`World`] abstraction. The host
//! embeds a [`Dispatcher`], forwards callbacks as [`Signal`]s, and calls
//! [`Dispatcher::tick`] once per frame.
//!
//! Modules are organized by responsibility:
//! - [`dispatcher`] owns the run: queue, active executor, interruptions
//! - [`executor`] drives one task kind each
//! - [`combat`] resolves encounters through pluggable combat modules
//! - [`world`] is the host seam, plus the scripted [`SimWorld`]
//! - [`events`] provides the topic-based event bus for observers
//! - [`api`] and [`config`] hold the control-surface errors and tunables
pub mod api;
pub mod combat;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod executor;
pub mod queue;
pub mod world;

pub use api::{Result, RuntimeError};
pub use combat::modules::{CombatModule, ItemUseModule, RotationModule, default_modules};
pub use combat::{CombatEngine, CombatStatus, CurrentFight};
pub use config::EngineConfig;
pub use dispatcher::{
    Dispatcher, DispatcherBuilder, LoggingHooks, RunState, Signal, SignalSender, StepHooks,
    recovery_tasks,
};
pub use events::{EventBus, InterruptCause, RunEvent, Topic};
pub use executor::{ExecutorFactory, ExecutorRegistry, ExecutorResult, TaskContext, TaskExecutor};
pub use queue::TaskQueue;
pub use world::{
    Effect, MoveCompleter, MoveError, MoveHandle, MovePoll, PendingMove, Reaction, SimCommand,
    SimWorld, Trigger, World,
};
