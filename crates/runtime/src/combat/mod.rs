//! Encounter resolution.
//!
//! [`CombatEngine`] owns the state of at most one encounter ([`CurrentFight`])
//! and is ticked by the fight executor. Each update it:
//!
//! 1. marks complex conditions satisfied by rewards or quest progress
//! 2. ranks visible candidates with [`PriorityScorer`]
//! 3. keeps, switches or clears the current target
//! 4. closes distance to the target when out of range or out of sight,
//!    dropping the approach once the target is no longer worth chasing
//! 5. decides whether the encounter is over
//!
//! The engine is the only writer of the host's current target while a fight
//! is active.
pub mod modules;

use std::time::Instant;

use quest_core::{
    AbortReason, CombatData, ConditionLedger, Conditions, GameObject, KillPriority, PlayerState,
    PriorityScorer, matches_quest_work,
};

use crate::config::EngineConfig;
use crate::world::{MovePoll, PendingMove, World};
use modules::CombatModule;

/// Hitbox overlap kept when approaching a target, so rounding never leaves
/// the actor just outside range.
const APPROACH_MARGIN: f32 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CombatStatus {
    #[default]
    NotStarted,
    InCombat,
    Moving,
    Complete,
}

/// Mutable state of the running encounter.
#[derive(Debug)]
pub struct CurrentFight {
    pub data: CombatData,
    pub ledger: ConditionLedger,
    module: usize,
    was_in_combat: bool,
    saw_candidate: bool,
    last_distance_check: Option<Instant>,
    pending_move: Option<PendingMove>,
}

impl CurrentFight {
    fn new(data: CombatData, module: usize) -> Self {
        Self {
            data,
            ledger: ConditionLedger::new(),
            module,
            was_in_combat: false,
            saw_candidate: false,
            last_distance_check: None,
            pending_move: None,
        }
    }
}

pub struct CombatEngine {
    modules: Vec<Box<dyn CombatModule>>,
    current: Option<CurrentFight>,
    status: CombatStatus,
    config: EngineConfig,
}

impl CombatEngine {
    pub fn new(modules: Vec<Box<dyn CombatModule>>, config: EngineConfig) -> Self {
        Self {
            modules,
            current: None,
            status: CombatStatus::NotStarted,
            config,
        }
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&CurrentFight> {
        self.current.as_ref()
    }

    /// Name of the module running the current encounter.
    pub fn module_name(&self) -> Option<&'static str> {
        let fight = self.current.as_ref()?;
        self.modules.get(fight.module).map(|module| module.name())
    }

    /// Starts an encounter with the first module that claims it.
    pub fn start(&mut self, data: CombatData, world: &mut dyn World) -> Result<(), AbortReason> {
        if self.current.is_some() {
            self.stop(world);
        }

        let index = self
            .modules
            .iter()
            .position(|module| module.can_handle_fight(&data))
            .ok_or(AbortReason::NoCombatModule)?;

        let module = &mut self.modules[index];
        if !module.start(&data, world) {
            return Err(AbortReason::Precondition(format!(
                "combat module {} could not start",
                module.name()
            )));
        }

        tracing::info!(
            target: "runtime::combat",
            module = module.name(),
            spawn_type = %data.spawn_type,
            kill_list = data.kill_list.len(),
            complex_conditions = data.complex_conditions.len(),
            "encounter started"
        );
        self.current = Some(CurrentFight::new(data, index));
        self.status = CombatStatus::NotStarted;
        Ok(())
    }

    /// Stops the module and forgets the encounter. Safe to call when idle.
    pub fn stop(&mut self, world: &mut dyn World) {
        let Some(mut fight) = self.current.take() else {
            return;
        };
        if let Some(pending) = fight.pending_move.as_mut() {
            pending.cancel();
            world.stop_movement();
        }
        if let Some(module) = self.modules.get_mut(fight.module) {
            module.stop(world);
        }
        world.set_target(None);
        self.status = CombatStatus::NotStarted;
        tracing::debug!(target: "runtime::combat", "encounter stopped");
    }

    /// Waits for the next wave of an encounter whose enemies are gone but whose
    /// quest progress is not there yet.
    pub fn rearm(&mut self) {
        if let Some(fight) = self.current.as_mut() {
            fight.was_in_combat = false;
            fight.saw_candidate = false;
        }
        self.status = CombatStatus::NotStarted;
    }

    pub fn update(&mut self, world: &mut dyn World) -> CombatStatus {
        let status = self.evaluate(world);
        if status != self.status {
            tracing::debug!(target: "runtime::combat", from = %self.status, to = %status, "combat status");
        }
        self.status = status;
        status
    }

    fn evaluate(&mut self, world: &mut dyn World) -> CombatStatus {
        let Some(fight) = self.current.as_mut() else {
            return CombatStatus::Complete;
        };
        let now = world.now();
        let in_combat = world.conditions().contains(Conditions::IN_COMBAT);
        if in_combat {
            fight.was_in_combat = true;
        }

        mark_satisfied_conditions(fight, world);

        let Some(player) = world.player() else {
            return self.status;
        };
        let objects = world.objects();
        let hate_list = world.hate_list();
        let module = &mut self.modules[fight.module];

        let scorer = PriorityScorer::new(&fight.data, &fight.ledger, player.id, &hate_list);
        let next = scorer.select(
            objects.iter().filter(|candidate| module.can_attack(candidate)),
            player.position,
        );
        if next.is_some() {
            fight.saw_candidate = true;
        }

        let current = world
            .target()
            .and_then(|id| objects.iter().find(|object| object.id == id));

        if let Some(pending) = fight.pending_move.as_mut() {
            let chasing = current.zip(next).is_some_and(|(current, (next, priority))| {
                current.id == next.id || !outranks(&scorer, current, priority)
            });
            let combat_ended = fight.was_in_combat && !in_combat;

            if chasing && !combat_ended {
                match pending.poll(now) {
                    MovePoll::Pending => return CombatStatus::Moving,
                    MovePoll::Arrived => {}
                    MovePoll::Failed(error) => {
                        tracing::warn!(
                            target: "runtime::combat",
                            %error,
                            destination = %pending.destination(),
                            "approach failed"
                        );
                    }
                    MovePoll::TimedOut => {
                        tracing::warn!(
                            target: "runtime::combat",
                            destination = %pending.destination(),
                            "approach timed out"
                        );
                    }
                }
            } else {
                pending.cancel();
                world.stop_movement();
                tracing::debug!(
                    target: "runtime::combat",
                    destination = %pending.destination(),
                    combat_ended,
                    "approach abandoned"
                );
            }
            fight.pending_move = None;
        }

        match (current, next) {
            (Some(current), Some((next, _))) if current.id == next.id => {
                if start_approach(fight, &self.config, &player, current, world, now) {
                    return CombatStatus::Moving;
                }
                module.update(current, world);
                return CombatStatus::InCombat;
            }
            (Some(current), Some((next, next_priority))) => {
                if outranks(&scorer, current, next_priority) {
                    tracing::info!(
                        target: "runtime::combat",
                        from = %current.id,
                        to = %next.id,
                        priority = next_priority.value().unwrap_or(0),
                        "switching target"
                    );
                    world.set_target(Some(next.id));
                    fight.last_distance_check = None;
                }
            }
            (Some(current), None) => {
                tracing::debug!(target: "runtime::combat", target = %current.id, "no valid target left");
                world.set_target(None);
            }
            (None, Some((next, priority))) => {
                tracing::info!(
                    target: "runtime::combat",
                    target = %next.id,
                    data_id = %next.data_id,
                    priority = priority.value().unwrap_or(0),
                    reason = ?priority.reason,
                    "selected target"
                );
                world.set_target(Some(next.id));
                fight.last_distance_check = None;
            }
            (None, None) => {}
        }

        if in_combat {
            CombatStatus::InCombat
        } else if fight.was_in_combat {
            CombatStatus::Complete
        } else if fight.data.spawn_type.is_fire_and_forget() && !fight.saw_candidate {
            CombatStatus::Complete
        } else {
            CombatStatus::InCombat
        }
    }
}

/// A new selection replaces the current target only with a strictly higher
/// priority, or when the current one is worth nothing. Dead or untargetable
/// targets are worth nothing.
fn outranks(scorer: &PriorityScorer<'_>, current: &GameObject, next: KillPriority) -> bool {
    if current.is_dead || !current.is_targetable {
        return true;
    }
    let current_value = scorer.score(current).value().unwrap_or(0);
    next.value().unwrap_or(0) > current_value || current_value == 0
}

fn mark_satisfied_conditions(fight: &mut CurrentFight, world: &dyn World) {
    let progress = fight
        .data
        .quest
        .and_then(|quest| world.quest_progress(quest));

    for (index, condition) in fight.data.complex_conditions.iter().enumerate() {
        if fight.ledger.is_satisfied(index) {
            continue;
        }

        let rewarded = condition
            .reward
            .is_some_and(|reward| world.item_count(reward.item) >= reward.count);
        let progressed = progress
            .as_ref()
            .is_some_and(|progress| matches_quest_work(&condition.completion, progress));

        if (rewarded || progressed) && fight.ledger.mark(index) {
            tracing::info!(
                target: "runtime::combat",
                condition = index,
                data_id = %condition.data_id,
                rewarded,
                progressed,
                "complex condition satisfied"
            );
        }
    }
}

/// Starts moving toward `target` if it is out of range or out of sight.
///
/// Runs at most once per `distance_check_interval`. Returns true if a move
/// was issued.
fn start_approach(
    fight: &mut CurrentFight,
    config: &EngineConfig,
    player: &PlayerState,
    target: &GameObject,
    world: &mut dyn World,
    now: Instant,
) -> bool {
    if let Some(last) = fight.last_distance_check
        && now.duration_since(last) < config.distance_check_interval
    {
        return false;
    }
    fight.last_distance_check = Some(now);

    let range = config.engagement_range(player.role);
    let surface = target.surface_distance(player.position, player.hitbox_radius);
    let in_sight = world.in_line_of_sight(target);
    if surface <= range && in_sight {
        return false;
    }

    let hitboxes = target.hitbox_radius + player.hitbox_radius;
    // Out of sight but in range: close half the gap and look again.
    let approach = if in_sight { range } else { range.min(surface) / 2.0 };
    let stop_distance = (approach + hitboxes - APPROACH_MARGIN).max(0.0);

    let handle = if in_sight && surface <= config.direct_move_threshold {
        world.move_direct(target.position, stop_distance)
    } else {
        world.navigate_to(target.position, stop_distance)
    };
    tracing::debug!(
        target: "runtime::combat",
        target = %target.id,
        surface,
        range,
        in_sight,
        "approaching target"
    );
    fight.pending_move = Some(PendingMove::new(
        handle,
        target.position,
        now + config.move_timeout,
    ));
    true
}
