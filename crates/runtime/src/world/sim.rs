//! Scripted in-memory world.
//!
//! `SimWorld` advances only when the host calls [`SimWorld::advance`], which
//! makes runs fully deterministic: movement travels at a fixed speed, dialogue
//! and casts last a fixed time, and engaged enemies lose health at a fixed
//! rate. Quest progress changes through [`Reaction`]s fired by interactions,
//! item uses and kills.
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use quest_core::{
    AetheryteId, Conditions, DataId, GameObject, ItemId, ObjectId, PlayerState, Position, QuestId,
    QuestProgress,
};
use serde::{Deserialize, Serialize};

use super::{MoveCompleter, MoveError, MoveHandle, World};

/// Event that fires a [`Reaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Dialogue with an object spawned from this template finished.
    Interact(DataId),
    /// A cast of this item finished.
    UseItem(ItemId),
    /// An object spawned from this template died.
    Killed(DataId),
}

/// World change applied when a reaction fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    SetProgress(QuestProgress),
    Attune(AetheryteId),
    Spawn(GameObject),
    Despawn(DataId),
    GiveItem { item: ItemId, count: u32 },
    /// Every live object from this template starts attacking the actor.
    Aggro(DataId),
    SetConditions(Conditions),
    ClearConditions(Conditions),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub trigger: Trigger,
    pub effects: Vec<Effect>,
    /// Fire on every matching trigger instead of only the first.
    #[serde(default)]
    pub repeat: bool,
}

impl Reaction {
    pub fn new(trigger: Trigger, effects: Vec<Effect>) -> Self {
        Self {
            trigger,
            effects,
            repeat: false,
        }
    }
}

/// Command issued to the world, recorded for inspection.
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    MoveDirect(Position),
    Navigate(Position),
    StopMovement,
    Interact(ObjectId),
    UseItem(ItemId, Option<ObjectId>),
    Mount,
    Unmount,
    Engage(ObjectId),
}

#[derive(Debug)]
struct Route {
    destination: Position,
    stop_distance: f32,
    completer: MoveCompleter,
}

#[derive(Debug)]
struct Timed<T> {
    remaining: Duration,
    payload: T,
}

pub struct SimWorld {
    epoch: Instant,
    elapsed: Duration,
    player: Option<PlayerState>,
    conditions: Conditions,
    objects: Vec<GameObject>,
    hate_list: Vec<ObjectId>,
    blocked_sight: HashSet<ObjectId>,
    progress: HashMap<QuestId, QuestProgress>,
    items: HashMap<ItemId, u32>,
    attuned: HashSet<AetheryteId>,
    target: Option<ObjectId>,
    auto_rotation: bool,
    engaged: Option<ObjectId>,
    route: Option<Route>,
    dialogue: Option<Timed<DataId>>,
    cast: Option<Timed<ItemId>>,
    reactions: Vec<Reaction>,
    commands: Vec<SimCommand>,
    movement_blocked: bool,
    mount_allowed: bool,
    move_speed: f32,
    damage_per_second: f32,
    damage_carry: f32,
    dialogue_time: Duration,
    cast_time: Duration,
}

impl SimWorld {
    pub const DEFAULT_MOVE_SPEED: f32 = 6.0;
    pub const DEFAULT_DAMAGE_PER_SECOND: f32 = 25.0;
    pub const DEFAULT_DIALOGUE_TIME: Duration = Duration::from_millis(500);
    pub const DEFAULT_CAST_TIME: Duration = Duration::from_secs(1);

    pub fn new(player: PlayerState) -> Self {
        Self {
            epoch: Instant::now(),
            elapsed: Duration::ZERO,
            player: Some(player),
            conditions: Conditions::empty(),
            objects: Vec::new(),
            hate_list: Vec::new(),
            blocked_sight: HashSet::new(),
            progress: HashMap::new(),
            items: HashMap::new(),
            attuned: HashSet::new(),
            target: None,
            auto_rotation: false,
            engaged: None,
            route: None,
            dialogue: None,
            cast: None,
            reactions: Vec::new(),
            commands: Vec::new(),
            movement_blocked: false,
            mount_allowed: true,
            move_speed: Self::DEFAULT_MOVE_SPEED,
            damage_per_second: Self::DEFAULT_DAMAGE_PER_SECOND,
            damage_carry: 0.0,
            dialogue_time: Self::DEFAULT_DIALOGUE_TIME,
            cast_time: Self::DEFAULT_CAST_TIME,
        }
    }

    // ===== setup =====

    #[must_use]
    pub fn with_object(mut self, object: GameObject) -> Self {
        self.spawn(object);
        self
    }

    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    #[must_use]
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    #[must_use]
    pub fn with_damage_per_second(mut self, damage: f32) -> Self {
        self.damage_per_second = damage;
        self
    }

    pub fn spawn(&mut self, object: GameObject) {
        if object.in_combat && object.target.is_some() && object.target == self.player_id() {
            self.add_hate(object.id);
        }
        self.objects.push(object);
    }

    /// Removes every object spawned from `data_id`.
    pub fn despawn(&mut self, data_id: DataId) {
        let removed: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|object| object.data_id == data_id)
            .map(|object| object.id)
            .collect();
        self.objects.retain(|object| object.data_id != data_id);
        for id in removed {
            self.forget(id);
        }
        self.refresh_combat_flag();
    }

    pub fn set_progress(&mut self, progress: QuestProgress) {
        self.progress.insert(progress.quest, progress);
    }

    pub fn give_item(&mut self, item: ItemId, count: u32) {
        *self.items.entry(item).or_default() += count;
    }

    pub fn attune(&mut self, aetheryte: AetheryteId) {
        self.attuned.insert(aetheryte);
    }

    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    pub fn insert_conditions(&mut self, conditions: Conditions) {
        self.conditions.insert(conditions);
    }

    pub fn remove_conditions(&mut self, conditions: Conditions) {
        self.conditions.remove(conditions);
    }

    pub fn block_line_of_sight(&mut self, object: ObjectId) {
        self.blocked_sight.insert(object);
    }

    pub fn clear_line_of_sight(&mut self, object: ObjectId) {
        self.blocked_sight.remove(&object);
    }

    /// Makes every movement request fail with [`MoveError::NoPath`].
    pub fn set_movement_blocked(&mut self, blocked: bool) {
        self.movement_blocked = blocked;
    }

    pub fn set_mount_allowed(&mut self, allowed: bool) {
        self.mount_allowed = allowed;
    }

    pub fn set_player_position(&mut self, position: Position) {
        if let Some(player) = self.player.as_mut() {
            player.position = position;
        }
    }

    /// Every live object from `data_id` starts attacking the actor.
    pub fn aggro(&mut self, data_id: DataId) {
        let Some(player) = self.player_id() else {
            return;
        };
        let ids: Vec<ObjectId> = self
            .objects
            .iter_mut()
            .filter(|object| object.data_id == data_id && !object.is_dead)
            .map(|object| {
                object.in_combat = true;
                object.target = Some(player);
                object.id
            })
            .collect();
        for id in ids {
            self.add_hate(id);
        }
    }

    /// Kills an object outright and fires its kill reactions.
    pub fn kill(&mut self, id: ObjectId) {
        let Some(object) = self.objects.iter_mut().find(|object| object.id == id) else {
            return;
        };
        if object.is_dead {
            return;
        }
        object.is_dead = true;
        object.in_combat = false;
        object.target = None;
        object.health_percent = 0;
        let data_id = object.data_id;
        tracing::debug!(target: "runtime::sim", object = %id, data_id = %data_id, "object died");

        self.forget(id);
        self.refresh_combat_flag();
        self.fire(Trigger::Killed(data_id));
    }

    // ===== inspection =====

    pub fn commands(&self) -> &[SimCommand] {
        &self.commands
    }

    pub fn auto_rotation(&self) -> bool {
        self.auto_rotation
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_moving(&self) -> bool {
        self.route.is_some()
    }

    pub fn object_by_data_id(&self, data_id: DataId) -> Option<&GameObject> {
        self.objects.iter().find(|object| object.data_id == data_id)
    }

    // ===== simulation =====

    /// Advances the simulated clock and everything that depends on it.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        self.advance_route(dt.as_secs_f32());
        self.advance_dialogue(dt);
        self.advance_cast(dt);
        self.advance_combat(dt.as_secs_f32());
    }

    fn advance_route(&mut self, seconds: f32) {
        let Some(mut route) = self.route.take() else {
            return;
        };
        if route.completer.is_cancelled() {
            tracing::trace!(target: "runtime::sim", "route abandoned by engine");
            return;
        }
        if self.movement_blocked {
            route.completer.fail(MoveError::NoPath);
            return;
        }
        let Some(player) = self.player.as_mut() else {
            route.completer.fail(MoveError::Blocked);
            return;
        };

        let offset = Position::new(
            route.destination.x - player.position.x,
            route.destination.y - player.position.y,
            route.destination.z - player.position.z,
        );
        let distance = player.position.distance(route.destination);
        let remaining = distance - route.stop_distance;
        let step = (self.move_speed * seconds).min(remaining.max(0.0));
        if distance > f32::EPSILON {
            let scale = step / distance;
            player.position = Position::new(
                player.position.x + offset.x * scale,
                player.position.y + offset.y * scale,
                player.position.z + offset.z * scale,
            );
        }

        if remaining - step <= 0.01 {
            tracing::debug!(target: "runtime::sim", position = %player.position, "route finished");
            route.completer.arrive();
        } else {
            self.route = Some(route);
        }
    }

    fn advance_dialogue(&mut self, dt: Duration) {
        let Some(mut dialogue) = self.dialogue.take() else {
            return;
        };
        dialogue.remaining = dialogue.remaining.saturating_sub(dt);
        if dialogue.remaining.is_zero() {
            self.conditions.remove(Conditions::OCCUPIED);
            self.fire(Trigger::Interact(dialogue.payload));
        } else {
            self.dialogue = Some(dialogue);
        }
    }

    fn advance_cast(&mut self, dt: Duration) {
        let Some(mut cast) = self.cast.take() else {
            return;
        };
        cast.remaining = cast.remaining.saturating_sub(dt);
        if cast.remaining.is_zero() {
            self.conditions.remove(Conditions::CASTING);
            self.fire(Trigger::UseItem(cast.payload));
        } else {
            self.cast = Some(cast);
        }
    }

    fn advance_combat(&mut self, seconds: f32) {
        let Some(id) = self.engaged else {
            return;
        };
        if !self.auto_rotation {
            return;
        }
        self.damage_carry += self.damage_per_second * seconds;
        let whole = self.damage_carry.floor();
        self.damage_carry -= whole;
        let damage = whole.min(f32::from(u8::MAX)) as u8;

        let Some(object) = self.objects.iter_mut().find(|object| object.id == id) else {
            self.engaged = None;
            return;
        };
        object.health_percent = object.health_percent.saturating_sub(damage);
        if object.health_percent == 0 {
            self.kill(id);
        }
    }

    fn fire(&mut self, trigger: Trigger) {
        let mut effects = Vec::new();
        self.reactions.retain(|reaction| {
            if reaction.trigger != trigger {
                return true;
            }
            effects.extend(reaction.effects.iter().cloned());
            reaction.repeat
        });
        if !effects.is_empty() {
            tracing::debug!(target: "runtime::sim", ?trigger, effects = effects.len(), "reaction fired");
        }
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetProgress(progress) => self.set_progress(progress),
            Effect::Attune(aetheryte) => self.attune(aetheryte),
            Effect::Spawn(object) => self.spawn(object),
            Effect::Despawn(data_id) => self.despawn(data_id),
            Effect::GiveItem { item, count } => self.give_item(item, count),
            Effect::Aggro(data_id) => self.aggro(data_id),
            Effect::SetConditions(conditions) => self.insert_conditions(conditions),
            Effect::ClearConditions(conditions) => self.remove_conditions(conditions),
        }
    }

    fn player_id(&self) -> Option<ObjectId> {
        self.player.as_ref().map(|player| player.id)
    }

    fn add_hate(&mut self, id: ObjectId) {
        if !self.hate_list.contains(&id) {
            self.hate_list.push(id);
        }
        self.conditions.insert(Conditions::IN_COMBAT);
    }

    fn forget(&mut self, id: ObjectId) {
        self.hate_list.retain(|entry| *entry != id);
        if self.engaged == Some(id) {
            self.engaged = None;
        }
        if self.target == Some(id) {
            self.target = None;
        }
    }

    fn refresh_combat_flag(&mut self) {
        if self.hate_list.is_empty() {
            self.conditions.remove(Conditions::IN_COMBAT);
        }
    }

    fn start_route(&mut self, destination: Position, stop_distance: f32) -> MoveHandle {
        if self.player.is_none() {
            return MoveHandle::resolved(Err(MoveError::Blocked));
        }
        let (handle, completer) = MoveHandle::channel();
        // Replacing the route drops the previous completer; its handle reads as cancelled.
        self.route = Some(Route {
            destination,
            stop_distance,
            completer,
        });
        handle
    }
}

impl World for SimWorld {
    fn now(&self) -> Instant {
        self.epoch + self.elapsed
    }

    fn player(&self) -> Option<PlayerState> {
        self.player.clone()
    }

    fn conditions(&self) -> Conditions {
        self.conditions
    }

    fn objects(&self) -> Vec<GameObject> {
        self.objects.clone()
    }

    fn hate_list(&self) -> Vec<ObjectId> {
        self.hate_list.clone()
    }

    fn in_line_of_sight(&self, object: &GameObject) -> bool {
        !self.blocked_sight.contains(&object.id)
    }

    fn quest_progress(&self, quest: QuestId) -> Option<QuestProgress> {
        self.progress.get(&quest).copied()
    }

    fn item_count(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    fn is_attuned(&self, aetheryte: AetheryteId) -> bool {
        self.attuned.contains(&aetheryte)
    }

    fn target(&self) -> Option<ObjectId> {
        self.target
    }

    fn set_target(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    fn move_direct(&mut self, destination: Position, stop_distance: f32) -> MoveHandle {
        self.commands.push(SimCommand::MoveDirect(destination));
        self.start_route(destination, stop_distance)
    }

    fn navigate_to(&mut self, destination: Position, stop_distance: f32) -> MoveHandle {
        self.commands.push(SimCommand::Navigate(destination));
        self.start_route(destination, stop_distance)
    }

    fn stop_movement(&mut self) {
        self.commands.push(SimCommand::StopMovement);
        self.route = None;
    }

    fn interact(&mut self, object: ObjectId) -> bool {
        self.commands.push(SimCommand::Interact(object));
        let Some(data_id) = self
            .objects
            .iter()
            .find(|candidate| candidate.id == object && candidate.is_targetable && !candidate.is_dead)
            .map(|candidate| candidate.data_id)
        else {
            return false;
        };
        self.conditions.insert(Conditions::OCCUPIED);
        self.dialogue = Some(Timed {
            remaining: self.dialogue_time,
            payload: data_id,
        });
        true
    }

    fn use_item(&mut self, item: ItemId, target: Option<ObjectId>) -> bool {
        self.commands.push(SimCommand::UseItem(item, target));
        if self.item_count(item) == 0 || self.conditions.contains(Conditions::CASTING) {
            return false;
        }
        self.conditions.insert(Conditions::CASTING);
        self.cast = Some(Timed {
            remaining: self.cast_time,
            payload: item,
        });
        true
    }

    fn mount(&mut self) -> bool {
        self.commands.push(SimCommand::Mount);
        if !self.mount_allowed || self.conditions.contains(Conditions::IN_COMBAT) {
            return false;
        }
        self.conditions.insert(Conditions::MOUNTED);
        true
    }

    fn unmount(&mut self) -> bool {
        self.commands.push(SimCommand::Unmount);
        self.conditions.remove(Conditions::MOUNTED);
        true
    }

    fn set_auto_rotation(&mut self, enabled: bool) {
        self.auto_rotation = enabled;
    }

    fn engage(&mut self, target: ObjectId) -> bool {
        self.commands.push(SimCommand::Engage(target));
        let Some(player) = self.player_id() else {
            return false;
        };
        let Some(object) = self
            .objects
            .iter_mut()
            .find(|object| object.id == target && !object.is_dead)
        else {
            return false;
        };
        object.in_combat = true;
        object.target = Some(player);
        self.engaged = Some(target);
        self.add_hate(target);
        true
    }
}

#[cfg(test)]
mod tests {
    use quest_core::{ClassRole, ObjectKind};

    use super::*;
    use crate::world::{MovePoll, PendingMove};

    const PLAYER: ObjectId = ObjectId(1);

    fn world() -> SimWorld {
        SimWorld::new(PlayerState::new(PLAYER, Position::ORIGIN, ClassRole::Melee))
    }

    fn enemy(id: u64, data_id: u32) -> GameObject {
        GameObject::new(
            ObjectId(id),
            DataId(data_id),
            ObjectKind::Enemy,
            Position::new(3.0, 0.0, 0.0),
        )
    }

    #[test]
    fn routes_travel_at_move_speed() {
        let mut world = world();
        let handle = world.move_direct(Position::new(12.0, 0.0, 0.0), 0.0);
        let mut pending = PendingMove::new(handle, Position::ORIGIN, world.now() + Duration::from_secs(10));

        world.advance(Duration::from_secs(1));
        assert_eq!(pending.poll(world.now()), MovePoll::Pending);
        let x = world.player().map(|player| player.position.x);
        assert_eq!(x, Some(6.0));

        world.advance(Duration::from_secs(1));
        assert_eq!(pending.poll(world.now()), MovePoll::Arrived);
    }

    #[test]
    fn blocked_movement_fails() {
        let mut world = world();
        world.set_movement_blocked(true);
        let handle = world.navigate_to(Position::new(50.0, 0.0, 0.0), 1.0);
        let mut pending = PendingMove::new(handle, Position::ORIGIN, world.now() + Duration::from_secs(10));
        world.advance(Duration::from_millis(100));
        assert_eq!(pending.poll(world.now()), MovePoll::Failed(MoveError::NoPath));
    }

    #[test]
    fn engaged_enemy_dies_and_combat_clears() {
        let mut world = world().with_object(enemy(10, 500)).with_damage_per_second(50.0);
        world.set_auto_rotation(true);
        assert!(world.engage(ObjectId(10)));
        assert!(world.conditions().contains(Conditions::IN_COMBAT));

        world.advance(Duration::from_secs(1));
        assert!(world.conditions().contains(Conditions::IN_COMBAT));
        world.advance(Duration::from_secs(1));

        assert!(!world.conditions().contains(Conditions::IN_COMBAT));
        assert!(world.object(ObjectId(10)).is_some_and(|object| object.is_dead));
        assert!(world.hate_list().is_empty());
    }

    #[test]
    fn dialogue_fires_interact_reactions() {
        let npc = GameObject::new(ObjectId(20), DataId(900), ObjectKind::Friendly, Position::ORIGIN);
        let progress = QuestProgress {
            quest: QuestId(5),
            sequence: 1,
            variables: [0x10, 0, 0, 0, 0, 0],
        };
        let mut world = world()
            .with_object(npc)
            .with_reaction(Reaction::new(
                Trigger::Interact(DataId(900)),
                vec![Effect::SetProgress(progress)],
            ));

        assert!(world.interact(ObjectId(20)));
        assert!(world.conditions().contains(Conditions::OCCUPIED));
        world.advance(SimWorld::DEFAULT_DIALOGUE_TIME);

        assert!(!world.conditions().contains(Conditions::OCCUPIED));
        assert_eq!(world.quest_progress(QuestId(5)), Some(progress));
    }

    #[test]
    fn kill_reactions_fire_once() {
        let mut world = world()
            .with_object(enemy(10, 500))
            .with_object(enemy(11, 500))
            .with_reaction(Reaction::new(
                Trigger::Killed(DataId(500)),
                vec![Effect::GiveItem {
                    item: ItemId(7),
                    count: 1,
                }],
            ));

        world.kill(ObjectId(10));
        world.kill(ObjectId(11));
        assert_eq!(world.item_count(ItemId(7)), 1);
    }

    #[test]
    fn aggro_puts_actor_in_combat() {
        let mut world = world().with_object(enemy(10, 500));
        world.aggro(DataId(500));
        let object = world.object(ObjectId(10));
        assert_eq!(object.and_then(|object| object.target), Some(PLAYER));
        assert_eq!(world.hate_list(), vec![ObjectId(10)]);
        assert!(world.conditions().contains(Conditions::IN_COMBAT));
    }
}
