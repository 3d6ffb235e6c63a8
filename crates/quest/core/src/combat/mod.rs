//! Encounter descriptors and kill-priority scoring.
//!
//! - [`data`] describes what an encounter wants killed and when it is done
//! - [`priority`] ranks visible candidates against that description
//!
//! Both are pure: the runtime's combat engine owns the mutable encounter state
//! and calls in here with fresh world snapshots every tick.
mod data;
mod priority;

pub use data::{
    CombatData, CombatItemUse, ComplexCombatCondition, ConditionLedger, RewardCount, SpawnType,
};
pub use priority::{
    AggroBonus, COMPLEX_CONDITION_PRIORITY, GENERIC_HOSTILE_PRIORITY, HATE_LIST_BONUS,
    KILL_LIST_PRIORITY, KillPriority, PriorityReason, PriorityScorer, TARGETING_ACTOR_BONUS,
};
