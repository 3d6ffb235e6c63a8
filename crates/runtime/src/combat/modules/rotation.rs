use quest_core::{CombatData, GameObject, ObjectId};

use super::CombatModule;
use crate::world::World;

/// Fallback module: hands fighting to the host's automatic rotation.
#[derive(Debug, Default)]
pub struct RotationModule {
    engaged: Option<ObjectId>,
}

impl CombatModule for RotationModule {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn can_handle_fight(&self, _data: &CombatData) -> bool {
        true
    }

    fn start(&mut self, _data: &CombatData, world: &mut dyn World) -> bool {
        self.engaged = None;
        world.set_auto_rotation(true);
        true
    }

    fn update(&mut self, target: &GameObject, world: &mut dyn World) {
        if self.engaged == Some(target.id) {
            return;
        }
        if world.engage(target.id) {
            tracing::debug!(target: "runtime::combat", target = %target.id, "rotation engaged");
            self.engaged = Some(target.id);
        }
    }

    fn stop(&mut self, world: &mut dyn World) {
        self.engaged = None;
        world.set_auto_rotation(false);
    }
}
