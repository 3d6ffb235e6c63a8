//! Kill-priority scoring for combat target selection.
//!
//! Every visible object is scored in two stages:
//!
//! 1. **Raw priority**: is the object a legal target at all, and how relevant
//!    is it to the encounter?
//!    - excluded: not hostile, dead, untargetable, or part of an unrelated spawn
//!    - [`COMPLEX_CONDITION_PRIORITY`]: matches an unsatisfied complex condition
//!    - [`KILL_LIST_PRIORITY`]: on the flat kill-list (only without complex conditions)
//!    - [`GENERIC_HOSTILE_PRIORITY`]: anything else hostile
//! 2. **Aggro bonus**: relevant objects already fighting the actor jump the
//!    queue, so the actor deals with whatever is hurting it first.
//!
//! ```text
//! combined = raw + (raw > 0 && in_combat ? bonus : 0)
//! bonus    = 150 if targeting actor, 125 if on actor's hate list, else 0
//! ```
//!
//! Selection picks the highest combined priority and breaks ties by distance.

use core::cmp::Ordering;

use super::data::{CombatData, ConditionLedger, SpawnType};
use crate::state::{GameObject, ObjectId, Position};

pub const COMPLEX_CONDITION_PRIORITY: u32 = 100;
pub const KILL_LIST_PRIORITY: u32 = 90;
pub const GENERIC_HOSTILE_PRIORITY: u32 = 0;
pub const TARGETING_ACTOR_BONUS: u32 = 150;
pub const HATE_LIST_BONUS: u32 = 125;

/// Why a candidate received its raw priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriorityReason {
    NotHostile,
    Dead,
    NotTargetable,
    UnrelatedSpawn,
    /// Matched the complex condition at this index.
    ComplexCondition(usize),
    KillList,
    /// Hostile, but irrelevant to the quest.
    NotPartOfQuest,
}

/// Bonus applied to candidates that are already fighting the actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AggroBonus {
    #[default]
    None,
    TargetingActor,
    OnHateList,
}

impl AggroBonus {
    pub const fn value(self) -> u32 {
        match self {
            Self::None => 0,
            Self::TargetingActor => TARGETING_ACTOR_BONUS,
            Self::OnHateList => HATE_LIST_BONUS,
        }
    }
}

/// Scored candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KillPriority {
    /// `None` when the candidate must not be attacked at all.
    pub raw: Option<u32>,
    pub bonus: AggroBonus,
    pub reason: PriorityReason,
}

impl KillPriority {
    const fn excluded(reason: PriorityReason) -> Self {
        Self {
            raw: None,
            bonus: AggroBonus::None,
            reason,
        }
    }

    /// Combined priority, or `None` for excluded candidates.
    pub fn value(&self) -> Option<u32> {
        self.raw.map(|raw| raw + self.bonus.value())
    }
}

/// Scores candidates against one encounter.
///
/// # Determinism
///
/// Scoring reads only the snapshot it is given. The same candidates, ledger
/// and hate list always produce the same ranking.
pub struct PriorityScorer<'a> {
    data: &'a CombatData,
    ledger: &'a ConditionLedger,
    actor: ObjectId,
    hate_list: &'a [ObjectId],
}

impl<'a> PriorityScorer<'a> {
    /// # Arguments
    ///
    /// * `data` - Encounter descriptor
    /// * `ledger` - Complex conditions already satisfied in this encounter
    /// * `actor` - The controlled actor
    /// * `hate_list` - Objects currently holding threat on the actor
    pub fn new(
        data: &'a CombatData,
        ledger: &'a ConditionLedger,
        actor: ObjectId,
        hate_list: &'a [ObjectId],
    ) -> Self {
        Self {
            data,
            ledger,
            actor,
            hate_list,
        }
    }

    /// Raw priority before aggro is considered.
    pub fn raw(&self, candidate: &GameObject) -> (Option<u32>, PriorityReason) {
        if !candidate.kind.is_hostile() {
            return (None, PriorityReason::NotHostile);
        }
        if candidate.is_dead {
            return (None, PriorityReason::Dead);
        }
        if !candidate.is_targetable {
            return (None, PriorityReason::NotTargetable);
        }
        if candidate.unrelated_spawn {
            return (None, PriorityReason::UnrelatedSpawn);
        }

        let conditions = &self.data.complex_conditions;
        if !conditions.is_empty() {
            let matched = conditions.iter().enumerate().find(|(index, condition)| {
                !self.ledger.is_satisfied(*index)
                    && condition.data_id == candidate.data_id
                    && condition
                        .name_id
                        .is_none_or(|name| candidate.name_id == Some(name))
                    && (condition.ignore_quest_marker || candidate.has_quest_marker)
            });
            if let Some((index, _)) = matched {
                return (
                    Some(COMPLEX_CONDITION_PRIORITY),
                    PriorityReason::ComplexCondition(index),
                );
            }
        } else if self.data.kill_list.contains(&candidate.data_id)
            && (self.data.spawn_type != SpawnType::OverworldEnemies || candidate.has_quest_marker)
        {
            return (Some(KILL_LIST_PRIORITY), PriorityReason::KillList);
        }

        (
            Some(GENERIC_HOSTILE_PRIORITY),
            PriorityReason::NotPartOfQuest,
        )
    }

    /// Raw priority plus aggro bonus.
    pub fn score(&self, candidate: &GameObject) -> KillPriority {
        let (raw, reason) = self.raw(candidate);
        let Some(raw_value) = raw else {
            return KillPriority::excluded(reason);
        };

        let bonus = if raw_value > 0 && candidate.in_combat {
            if candidate.target == Some(self.actor) {
                AggroBonus::TargetingActor
            } else if self.hate_list.contains(&candidate.id) {
                AggroBonus::OnHateList
            } else {
                AggroBonus::None
            }
        } else {
            AggroBonus::None
        };

        KillPriority { raw, bonus, reason }
    }

    /// Picks the best candidate: highest combined priority, then nearest to `origin`.
    ///
    /// Excluded candidates never win. Among exact ties in both priority and
    /// distance, the first candidate in iteration order is kept.
    pub fn select<'o, I>(&self, candidates: I, origin: Position) -> Option<(&'o GameObject, KillPriority)>
    where
        I: IntoIterator<Item = &'o GameObject>,
    {
        let mut best: Option<(&'o GameObject, KillPriority, u32, f32)> = None;

        for candidate in candidates {
            let priority = self.score(candidate);
            let Some(value) = priority.value() else {
                continue;
            };
            let distance = candidate.position.distance_squared(origin);

            let better = match &best {
                None => true,
                Some((_, _, best_value, best_distance)) => match value.cmp(best_value) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => distance < *best_distance,
                },
            };

            if better {
                best = Some((candidate, priority, value, distance));
            }
        }

        best.map(|(candidate, priority, _, _)| (candidate, priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ComplexCombatCondition;
    use crate::state::{DataId, ObjectKind};

    const ACTOR: ObjectId = ObjectId(1);

    fn enemy(id: u64, data_id: u32, position: Position) -> GameObject {
        GameObject::new(ObjectId(id), DataId(data_id), ObjectKind::Enemy, position)
    }

    #[test]
    fn excluded_candidates_have_no_priority() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        let mut dead = enemy(10, 5, Position::ORIGIN);
        dead.is_dead = true;
        let mut hidden = enemy(11, 5, Position::ORIGIN);
        hidden.is_targetable = false;
        let mut foreign = enemy(12, 5, Position::ORIGIN);
        foreign.unrelated_spawn = true;
        let friendly = GameObject::new(ObjectId(13), DataId(5), ObjectKind::Friendly, Position::ORIGIN);

        assert_eq!(scorer.raw(&dead), (None, PriorityReason::Dead));
        assert_eq!(scorer.raw(&hidden), (None, PriorityReason::NotTargetable));
        assert_eq!(scorer.raw(&foreign), (None, PriorityReason::UnrelatedSpawn));
        assert_eq!(scorer.raw(&friendly), (None, PriorityReason::NotHostile));
    }

    #[test]
    fn kill_list_scores_ninety_and_strangers_zero() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        assert_eq!(scorer.score(&enemy(10, 5, Position::ORIGIN)).value(), Some(90));
        assert_eq!(scorer.score(&enemy(11, 6, Position::ORIGIN)).value(), Some(0));
    }

    #[test]
    fn overworld_kill_list_requires_marker() {
        let data = CombatData::kill(SpawnType::OverworldEnemies, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        assert_eq!(scorer.score(&enemy(10, 5, Position::ORIGIN)).value(), Some(0));
        assert_eq!(
            scorer
                .score(&enemy(10, 5, Position::ORIGIN).with_quest_marker())
                .value(),
            Some(90)
        );
    }

    #[test]
    fn complex_conditions_shadow_the_kill_list() {
        let mut data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        data.complex_conditions.push(ComplexCombatCondition::new(DataId(7)));
        let mut ledger = ConditionLedger::new();

        {
            let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);
            let marked = enemy(10, 7, Position::ORIGIN).with_quest_marker();
            assert_eq!(scorer.score(&marked).value(), Some(100));
            assert_eq!(
                scorer.score(&marked).reason,
                PriorityReason::ComplexCondition(0)
            );
            // Unmarked objects do not match unless the condition ignores markers.
            assert_eq!(scorer.score(&enemy(11, 7, Position::ORIGIN)).value(), Some(0));
            // The kill-list is ignored while complex conditions exist.
            assert_eq!(scorer.score(&enemy(12, 5, Position::ORIGIN)).value(), Some(0));
        }

        ledger.mark(0);
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);
        let marked = enemy(10, 7, Position::ORIGIN).with_quest_marker();
        assert_eq!(scorer.score(&marked).value(), Some(0));
    }

    #[test]
    fn name_id_narrows_complex_match() {
        let mut data = CombatData::default();
        let mut condition = ComplexCombatCondition::new(DataId(7));
        condition.name_id = Some(42);
        condition.ignore_quest_marker = true;
        data.complex_conditions.push(condition);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        assert_eq!(
            scorer
                .score(&enemy(10, 7, Position::ORIGIN).with_name_id(42))
                .value(),
            Some(100)
        );
        assert_eq!(
            scorer
                .score(&enemy(11, 7, Position::ORIGIN).with_name_id(43))
                .value(),
            Some(0)
        );
    }

    #[test]
    fn kill_list_enemy_attacking_actor_scores_240() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        let attacker = enemy(10, 5, Position::ORIGIN).engaged_with(Some(ACTOR));
        let priority = scorer.score(&attacker);
        assert_eq!(priority.bonus, AggroBonus::TargetingActor);
        assert_eq!(priority.value(), Some(240));
    }

    #[test]
    fn hate_list_bonus_applies_when_not_targeting_actor() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let hate = [ObjectId(10)];
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &hate);

        let busy = enemy(10, 5, Position::ORIGIN).engaged_with(Some(ObjectId(99)));
        assert_eq!(scorer.score(&busy).value(), Some(215));

        let unlisted = enemy(11, 5, Position::ORIGIN).engaged_with(Some(ObjectId(99)));
        assert_eq!(scorer.score(&unlisted).value(), Some(90));
    }

    #[test]
    fn generic_hostiles_never_get_aggro_bonus() {
        let data = CombatData::interruption();
        let ledger = ConditionLedger::new();
        let hate = [ObjectId(10)];
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &hate);

        let attacker = enemy(10, 5, Position::ORIGIN).engaged_with(Some(ACTOR));
        assert_eq!(scorer.score(&attacker).value(), Some(0));
    }

    #[test]
    fn higher_priority_wins_regardless_of_distance() {
        let mut data = CombatData::kill(SpawnType::AfterInteraction, vec![]);
        let mut condition = ComplexCombatCondition::new(DataId(7));
        condition.ignore_quest_marker = true;
        data.complex_conditions.push(condition);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        let far_important = enemy(10, 7, Position::new(40.0, 0.0, 0.0));
        let near_other = enemy(11, 8, Position::new(1.0, 0.0, 0.0));
        let candidates = [near_other, far_important];

        let (picked, priority) = scorer.select(&candidates, Position::ORIGIN).unwrap();
        assert_eq!(picked.id, ObjectId(10));
        assert_eq!(priority.value(), Some(100));
    }

    #[test]
    fn hundred_beats_ninety_even_when_farther() {
        // Raw 100 comes from a complex condition of one encounter, raw 90 from
        // a kill-list; compare them through their combined values.
        let mut complex = CombatData::default();
        let mut condition = ComplexCombatCondition::new(DataId(7));
        condition.ignore_quest_marker = true;
        complex.complex_conditions.push(condition);
        let kill = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();

        let hundred = PriorityScorer::new(&complex, &ledger, ACTOR, &[])
            .score(&enemy(10, 7, Position::new(50.0, 0.0, 0.0)));
        let ninety = PriorityScorer::new(&kill, &ledger, ACTOR, &[])
            .score(&enemy(11, 5, Position::new(1.0, 0.0, 0.0)));
        assert!(hundred.value() > ninety.value());
    }

    #[test]
    fn equal_priority_prefers_nearest() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        let candidates = [
            enemy(10, 5, Position::new(10.0, 0.0, 0.0)),
            enemy(11, 5, Position::new(0.0, 0.0, 3.0)),
            enemy(12, 5, Position::new(-6.0, 0.0, 0.0)),
        ];

        let (picked, _) = scorer.select(&candidates, Position::ORIGIN).unwrap();
        assert_eq!(picked.id, ObjectId(11));
    }

    #[test]
    fn select_skips_excluded_candidates() {
        let data = CombatData::kill(SpawnType::AfterInteraction, vec![DataId(5)]);
        let ledger = ConditionLedger::new();
        let scorer = PriorityScorer::new(&data, &ledger, ACTOR, &[]);

        let mut dead = enemy(10, 5, Position::ORIGIN);
        dead.is_dead = true;
        assert!(scorer.select([&dead], Position::ORIGIN).is_none());
    }
}
