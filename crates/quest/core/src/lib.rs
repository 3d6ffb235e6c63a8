//! Pure data model for quest automation.
//!
//! `quest-core` defines the canonical vocabulary shared by the runtime and
//! offline tools: world snapshots ([`state`]), the task catalogue produced by
//! the step compiler ([`task`]), encounter descriptors and kill-priority
//! scoring ([`combat`]), and the typed abort signal raised by executors
//! ([`error`]). Nothing in this crate performs I/O or keeps time; the runtime
//! feeds it snapshots and acts on its answers.
pub mod combat;
pub mod error;
pub mod state;
pub mod task;

pub use combat::{
    AggroBonus, CombatData, CombatItemUse, ComplexCombatCondition, ConditionLedger, KillPriority,
    PriorityReason, PriorityScorer, RewardCount, SpawnType,
};
pub use error::{AbortReason, ErrorSeverity};
pub use state::{
    AetheryteId, ClassRole, Conditions, DataId, GameObject, ItemId, ObjectId, ObjectKind,
    PlayerState, Position, QuestId, QuestProgress, QuestWorkMode, QuestWorkValue,
    has_completion_flags, matches_quest_work,
};
pub use task::{
    Attune, Fight, Interact, MoveTo, StepRef, Task, TaskKind, TaskResult, UseItem, WaitCondition,
    WaitObjectAtPosition, WaitQuestFlags,
};
