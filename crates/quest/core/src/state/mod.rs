//! Snapshots of the world as seen by the automation engine.
//!
//! The runtime never owns world state; it receives these value types from the
//! world collaborator every tick and reasons over them.
mod common;
mod conditions;
mod object;
mod quest;

pub use common::{AetheryteId, ClassRole, DataId, ItemId, ObjectId, Position, QuestId};
pub use conditions::Conditions;
pub use object::{GameObject, ObjectKind, PlayerState};
pub use quest::{
    QuestProgress, QuestWorkMode, QuestWorkValue, has_completion_flags, matches_quest_work,
};
