//! Task catalogue consumed by the runtime.
//!
//! A step compiler turns one quest step into an ordered `Vec<Task>`. Tasks are
//! immutable values: all transient state (timers, retries, movement handles)
//! lives in the runtime executor bound to the task while it is active.
//!
//! Only the variant matters for dispatch; two tasks with equal payloads are
//! still two units of work.
mod result;

pub use result::TaskResult;

use core::fmt;
use core::time::Duration;

use crate::combat::CombatData;
use crate::state::{AetheryteId, Conditions, DataId, ItemId, Position, QuestId, QuestWorkValue};

/// Identity of a compiled quest step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepRef {
    pub quest: QuestId,
    pub sequence: u8,
    pub step: u16,
}

impl StepRef {
    pub const fn new(quest: QuestId, sequence: u8, step: u16) -> Self {
        Self {
            quest,
            sequence,
            step,
        }
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/seq {}/step {}", self.quest, self.sequence, self.step)
    }
}

/// One unit of scripted work.
#[derive(Clone, Debug, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(TaskKind),
    derive(Hash, strum::Display, strum::AsRefStr),
    strum(serialize_all = "snake_case")
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Task {
    /// Walk, ride or path to a point.
    Move(MoveTo),
    Mount,
    Unmount,
    /// Talk to an NPC or use an event object.
    Interact(Interact),
    UseItem(UseItem),
    /// Register an aetheryte as a teleport destination.
    Attune(Attune),
    /// Resolve an encounter through the combat engine.
    Fight(Fight),
    /// Do nothing for a fixed amount of time.
    Delay(Duration),
    WaitCondition(WaitCondition),
    WaitQuestFlags(WaitQuestFlags),
    WaitObjectAtPosition(WaitObjectAtPosition),
    /// Final task of a step; advances the step counter when reached.
    NextStep(StepRef),
    /// Final task of a script; ends the run.
    EndAutomation,
    /// Landing point for skipped work that must still run the step's bookkeeping.
    SkipMarker,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        TaskKind::from(self)
    }

    /// Tasks that should be replayed when the active task is preempted.
    ///
    /// Movement and mounting are cheap to repeat and are the usual victims of
    /// an interruption, so they survive re-activation.
    pub fn redo_on_interrupt(&self) -> bool {
        matches!(self, Task::Move(_) | Task::Mount)
    }

    /// Tasks that survive "skip the rest of this step".
    pub fn is_step_terminal(&self) -> bool {
        matches!(
            self,
            Task::NextStep(_) | Task::EndAutomation | Task::SkipMarker
        )
    }

    /// Shorthand for a fight that only clears whatever is attacking the actor.
    pub fn interruption_fight() -> Self {
        Task::Fight(Fight {
            combat: CombatData::interruption(),
        })
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Move(task) => match &task.label {
                Some(label) => write!(f, "Move({label})"),
                None => write!(f, "Move({})", task.destination),
            },
            Task::Mount => f.write_str("Mount"),
            Task::Unmount => f.write_str("Unmount"),
            Task::Interact(task) => write!(f, "Interact({})", task.data_id),
            Task::UseItem(task) => match task.target {
                Some(target) => write!(f, "UseItem({} on {target})", task.item),
                None => write!(f, "UseItem({})", task.item),
            },
            Task::Attune(task) => write!(f, "Attune({})", task.aetheryte),
            Task::Fight(task) => write!(
                f,
                "Fight({:?}, kill={}, conditions={})",
                task.combat.spawn_type,
                task.combat.kill_list.len(),
                task.combat.complex_conditions.len()
            ),
            Task::Delay(duration) => write!(f, "Delay({}ms)", duration.as_millis()),
            Task::WaitCondition(task) => {
                write!(f, "WaitCondition({:?}={})", task.condition, task.expected)
            }
            Task::WaitQuestFlags(task) => write!(f, "WaitQuestFlags({})", task.quest),
            Task::WaitObjectAtPosition(task) => {
                write!(f, "WaitObject({} at {})", task.data_id, task.position)
            }
            Task::NextStep(step) => write!(f, "NextStep({step})"),
            Task::EndAutomation => f.write_str("EndAutomation"),
            Task::SkipMarker => f.write_str("SkipMarker"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveTo {
    pub destination: Position,
    /// Arrival radius around the destination.
    pub stop_distance: f32,
    /// Force a pathfinding request even for short, unobstructed hops.
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_pathfinding: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

impl MoveTo {
    pub fn new(destination: Position, stop_distance: f32) -> Self {
        Self {
            destination,
            stop_distance,
            use_pathfinding: false,
            label: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interact {
    pub data_id: DataId,
    /// Known location of the object, used to walk closer when it is not visible.
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Option<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completion: Vec<Option<QuestWorkValue>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub quest: Option<QuestId>,
}

impl Interact {
    pub fn new(data_id: DataId) -> Self {
        Self {
            data_id,
            position: None,
            completion: Vec::new(),
            quest: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseItem {
    pub item: ItemId,
    /// Object to use the item on; `None` uses it on the actor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<DataId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completion: Vec<Option<QuestWorkValue>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub quest: Option<QuestId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attune {
    pub aetheryte: AetheryteId,
    /// Object to interact with to attune.
    pub data_id: DataId,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fight {
    pub combat: CombatData,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitCondition {
    pub condition: Conditions,
    /// Wait until the flag is set (`true`) or cleared (`false`).
    pub expected: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitQuestFlags {
    pub quest: QuestId,
    pub flags: Vec<Option<QuestWorkValue>>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitObjectAtPosition {
    pub data_id: DataId,
    pub position: Position,
    pub tolerance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_markers_survive_step_skip() {
        let step = StepRef::new(QuestId(7), 1, 0);
        assert!(Task::NextStep(step).is_step_terminal());
        assert!(Task::EndAutomation.is_step_terminal());
        assert!(Task::SkipMarker.is_step_terminal());
        assert!(!Task::Mount.is_step_terminal());
        assert!(!Task::interruption_fight().is_step_terminal());
    }

    #[test]
    fn movement_and_mount_are_redone() {
        let task = Task::Move(MoveTo::new(Position::ORIGIN, 1.0));
        assert!(task.redo_on_interrupt());
        assert!(Task::Mount.redo_on_interrupt());
        assert!(!Task::Unmount.redo_on_interrupt());
        assert!(!Task::Delay(Duration::from_secs(1)).redo_on_interrupt());
    }

    #[test]
    fn kind_labels_are_snake_case() {
        assert_eq!(Task::SkipMarker.kind().as_ref(), "skip_marker");
        assert_eq!(
            Task::Interact(Interact::new(DataId(3))).kind().to_string(),
            "interact"
        );
    }

    #[test]
    fn labels_are_human_readable() {
        let mut task = MoveTo::new(Position::new(1.0, 0.0, 2.0), 0.5);
        assert_eq!(Task::Move(task.clone()).to_string(), "Move((1.00, 0.00, 2.00))");
        task.label = Some("village gate".into());
        assert_eq!(Task::Move(task).to_string(), "Move(village gate)");
    }
}
