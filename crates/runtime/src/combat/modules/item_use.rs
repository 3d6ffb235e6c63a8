use std::collections::HashSet;

use quest_core::{CombatData, CombatItemUse, GameObject, ObjectId};

use super::CombatModule;
use crate::world::World;

/// Weakens a specific enemy with the rotation, then uses an item on it.
///
/// The rotation is paused while the item is used so the target is not
/// killed before the item lands.
#[derive(Debug, Default)]
pub struct ItemUseModule {
    item_use: Option<CombatItemUse>,
    used_on: HashSet<ObjectId>,
    engaged: Option<ObjectId>,
}

impl ItemUseModule {
    fn wants_item(&self, target: &GameObject) -> Option<CombatItemUse> {
        self.item_use.filter(|item_use| {
            target.data_id == item_use.enemy
                && target.health_percent < item_use.health_below_percent
                && !self.used_on.contains(&target.id)
        })
    }
}

impl CombatModule for ItemUseModule {
    fn name(&self) -> &'static str {
        "item_use"
    }

    fn can_handle_fight(&self, data: &CombatData) -> bool {
        data.item_use.is_some()
    }

    fn start(&mut self, data: &CombatData, world: &mut dyn World) -> bool {
        let Some(item_use) = data.item_use else {
            return false;
        };
        if world.item_count(item_use.item) == 0 {
            tracing::warn!(
                target: "runtime::combat",
                item = %item_use.item,
                "combat item is not in the inventory"
            );
            return false;
        }

        self.item_use = Some(item_use);
        self.used_on.clear();
        self.engaged = None;
        world.set_auto_rotation(true);
        true
    }

    fn update(&mut self, target: &GameObject, world: &mut dyn World) {
        if let Some(item_use) = self.wants_item(target) {
            world.set_auto_rotation(false);
            if world.use_item(item_use.item, Some(target.id)) {
                tracing::info!(
                    target: "runtime::combat",
                    item = %item_use.item,
                    target = %target.id,
                    health = target.health_percent,
                    "used combat item"
                );
                self.used_on.insert(target.id);
            }
            return;
        }

        world.set_auto_rotation(true);
        if self.engaged != Some(target.id) && world.engage(target.id) {
            self.engaged = Some(target.id);
        }
    }

    fn stop(&mut self, world: &mut dyn World) {
        self.item_use = None;
        self.engaged = None;
        world.set_auto_rotation(false);
    }
}

#[cfg(test)]
mod tests {
    use quest_core::{ClassRole, DataId, ItemId, ObjectKind, PlayerState, Position};

    use super::*;
    use crate::world::{SimCommand, SimWorld};

    fn data() -> CombatData {
        CombatData {
            item_use: Some(CombatItemUse {
                item: ItemId(77),
                enemy: DataId(300),
                health_below_percent: 50,
            }),
            ..CombatData::default()
        }
    }

    fn world() -> SimWorld {
        SimWorld::new(PlayerState::new(ObjectId(1), Position::ORIGIN, ClassRole::Melee))
    }

    #[test]
    fn refuses_to_start_without_the_item() {
        let mut world = world();
        let mut module = ItemUseModule::default();
        assert!(module.can_handle_fight(&data()));
        assert!(!module.start(&data(), &mut world));
    }

    #[test]
    fn uses_item_once_target_is_weak() {
        let mut world = world();
        world.give_item(ItemId(77), 1);
        let mut module = ItemUseModule::default();
        assert!(module.start(&data(), &mut world));

        let mut target = GameObject::new(ObjectId(5), DataId(300), ObjectKind::Enemy, Position::ORIGIN);
        module.update(&target, &mut world);
        assert_eq!(world.commands(), &[SimCommand::Engage(ObjectId(5))]);

        target.health_percent = 40;
        module.update(&target, &mut world);
        module.update(&target, &mut world);

        let uses = world
            .commands()
            .iter()
            .filter(|command| matches!(command, SimCommand::UseItem(..)))
            .count();
        assert_eq!(uses, 1);
    }
}
