use std::collections::BTreeSet;

use crate::state::{DataId, ItemId, QuestId, QuestWorkValue};

/// What makes the encounter's enemies appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnType {
    #[default]
    AfterInteraction,
    AfterItemUse,
    AfterAction,
    AfterEmote,
    AutoOnEnterArea,
    /// Enemies roam the open world; only marked ones count for the quest.
    OverworldEnemies,
    /// Kill whatever is already fighting, if anything.
    FinishCombatIfAny,
    /// Synthesized by the dispatcher to clear hostiles after an interruption.
    QuestInterruption,
}

impl SpawnType {
    /// Encounters that are allowed to finish without ever seeing a hostile.
    pub const fn is_fire_and_forget(self) -> bool {
        matches!(self, Self::FinishCombatIfAny | Self::QuestInterruption)
    }
}

/// Reward threshold: the condition is met once the inventory holds `count` of `item`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardCount {
    pub item: ItemId,
    pub count: u32,
}

/// One ordered, one-shot kill objective inside an encounter.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplexCombatCondition {
    pub data_id: DataId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name_id: Option<u32>,
    /// Match candidates even when the host shows no quest marker on them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_quest_marker: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reward: Option<RewardCount>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completion: Vec<Option<QuestWorkValue>>,
}

impl ComplexCombatCondition {
    pub fn new(data_id: DataId) -> Self {
        Self {
            data_id,
            ..Self::default()
        }
    }
}

/// Use an item on an enemy once it is weak enough (capture, pacify, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatItemUse {
    pub item: ItemId,
    pub enemy: DataId,
    pub health_below_percent: u8,
}

/// Immutable description of one encounter.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatData {
    #[cfg_attr(feature = "serde", serde(default))]
    pub quest: Option<QuestId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spawn_type: SpawnType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kill_list: Vec<DataId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub complex_conditions: Vec<ComplexCombatCondition>,
    /// Quest progress that ends the encounter regardless of remaining enemies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub completion: Vec<Option<QuestWorkValue>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item_use: Option<CombatItemUse>,
}

impl CombatData {
    /// Descriptor used to clear hostiles before resuming interrupted work.
    pub fn interruption() -> Self {
        Self {
            spawn_type: SpawnType::QuestInterruption,
            ..Self::default()
        }
    }

    pub fn kill(spawn_type: SpawnType, kill_list: Vec<DataId>) -> Self {
        Self {
            spawn_type,
            kill_list,
            ..Self::default()
        }
    }
}

/// Indices of complex conditions that have been satisfied during an encounter.
///
/// Marking is one-way: a satisfied condition is never re-checked or cleared
/// while the ledger lives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionLedger {
    satisfied: BTreeSet<usize>,
}

impl ConditionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a satisfied condition. Returns false if it was already recorded.
    pub fn mark(&mut self, index: usize) -> bool {
        self.satisfied.insert(index)
    }

    pub fn is_satisfied(&self, index: usize) -> bool {
        self.satisfied.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.satisfied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satisfied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_marks_once() {
        let mut ledger = ConditionLedger::new();
        assert!(ledger.mark(2));
        assert!(!ledger.mark(2));
        assert!(ledger.is_satisfied(2));
        assert!(!ledger.is_satisfied(0));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn interruption_fight_has_nothing_to_kill() {
        let data = CombatData::interruption();
        assert!(data.kill_list.is_empty());
        assert!(data.complex_conditions.is_empty());
        assert!(data.spawn_type.is_fire_and_forget());
        assert!(!SpawnType::AfterInteraction.is_fire_and_forget());
    }

    #[test]
    fn condition_defaults_to_an_unconstrained_kill() {
        let condition = ComplexCombatCondition::new(DataId(7));
        assert_eq!(condition.data_id, DataId(7));
        assert_eq!(condition.name_id, None);
        assert!(!condition.ignore_quest_marker);
        assert!(condition.reward.is_none());
        assert!(condition.completion.is_empty());
        assert_eq!(ComplexCombatCondition::default().data_id, DataId(0));
    }
}
